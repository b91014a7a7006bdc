use std::io;

fn main() -> io::Result<()> {
    retroscan::cli::main()
}
