//! `quay absolutize` command

use anyhow::Result;

use super::{print_args, resolve_compiler};
use crate::cli::AbsolutizeArgs;

pub fn execute(args: AbsolutizeArgs) -> Result<()> {
    let compiler = resolve_compiler(&args.identity)?;

    let out = compiler.absolute_path_args(&args.args, &args.build_dir);

    print_args(&out, args.json)
}
