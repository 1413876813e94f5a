//! `quay args` command

use anyhow::Result;

use super::{print_args, resolve_compiler};
use crate::cli::ArgsArgs;
use quay::compilers::Compiler;

pub fn execute(args: ArgsArgs) -> Result<()> {
    let compiler = resolve_compiler(&args.identity)?;

    let out = if args.link {
        link_args(compiler.as_ref(), &args)?
    } else {
        compile_args(compiler.as_ref(), &args)?
    };

    print_args(&out, args.json)
}

fn compile_args(compiler: &dyn Compiler, args: &ArgsArgs) -> Result<Vec<String>> {
    let mut out = compiler.buildtype_args(args.buildtype);

    if let Some(level) = args.optimization {
        out.extend(compiler.optimization_args(level)?);
    }
    if args.debug {
        out.extend(compiler.debug_args(true)?);
    }
    if args.pic {
        out.extend(compiler.pic_args()?);
    }
    if args.pie {
        out.extend(compiler.pie_args()?);
    }
    if let Some(visibility) = args.visibility {
        out.extend(compiler.symbol_visibility_args(visibility)?);
    }
    if let Some(ref name) = args.instruction_set {
        out.extend(compiler.instruction_set_args(name)?);
    }
    if let Some(ref value) = args.sanitize {
        out.extend(compiler.sanitizer_args(value)?);
    }
    if let Some(mode) = args.color {
        out.extend(compiler.colorout_args(mode)?);
    }
    if args.coverage {
        out.extend(compiler.coverage_args()?);
    }
    if let Some(level) = args.warn_level {
        out.extend(compiler.warn_args(level));
    }
    if args.werror {
        out.extend(compiler.werror_args());
    }
    if let Some(crt) = args.crt {
        out.extend(compiler.crt_compile_args(crt, args.buildtype)?);
    }
    for dir in &args.include {
        out.extend(compiler.include_args(dir, false));
    }
    if let Some(ref output) = args.output {
        out.extend(compiler.compile_only_args());
        out.extend(compiler.output_args(output));
    }

    Ok(out)
}

fn link_args(compiler: &dyn Compiler, args: &ArgsArgs) -> Result<Vec<String>> {
    let mut out = compiler.buildtype_linker_args(args.buildtype);

    if args.coverage {
        out.extend(compiler.coverage_args()?);
    }
    if let Some(crt) = args.crt {
        out.extend(compiler.crt_link_args(crt, args.buildtype)?);
    }
    out.extend(compiler.std_exe_link_args());
    if let Some(ref output) = args.output {
        out.extend(compiler.linker_output_args(output));
    }

    Ok(out)
}
