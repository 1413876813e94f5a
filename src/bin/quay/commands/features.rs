//! `quay features` command

use anyhow::{Context, Result};

use super::{print_args, resolve_compiler};
use crate::cli::FeaturesArgs;
use quay::compilers::FeatureRequest;

pub fn execute(args: FeaturesArgs) -> Result<()> {
    let compiler = resolve_compiler(&args.identity)?;

    let mut request: FeatureRequest =
        serde_json::from_str(&args.request).context("failed to parse feature request")?;

    let out = compiler.feature_args(&mut request, &args.build_to_src)?;

    print_args(&out, args.json)
}
