use crate::cmd::VersionArgs;
use crate::exit::{CliResult, SUCCESS};

pub fn run(args: VersionArgs) -> CliResult<i32> {
    println!("motornode {}", env!("CARGO_PKG_VERSION"));
    if args.extended {
        println!("repository: {}", env!("CARGO_PKG_REPOSITORY"));
        println!("rust-version: {}", env!("CARGO_PKG_RUST_VERSION"));
    }
    Ok(SUCCESS)
}
