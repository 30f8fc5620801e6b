fn main() {
  if let Err(err) = htmlcpr::cli::run_from_args() {
    eprintln!("htmlcpr error: {:#}", err);
    std::process::exit(1);
  }
}
