fn main() {
    api_codegen::init_tracing();
    std::process::exit(api_codegen::run_cli(std::env::args().collect()));
}
