use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    modeldeck::cli::main()
}
