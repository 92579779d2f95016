use std::path::PathBuf;

use serde::Serialize;
use toolsmith_core::{CatalogStats, LoadFailure};

use crate::cmd::{load_catalog, offline_context};
use crate::exit_codes;
use crate::output::{print_error, print_result};
use crate::{CatalogArgs, OutputArgs};

#[derive(Serialize)]
struct StatsResult {
    spec_dir: PathBuf,
    #[serde(flatten)]
    stats: CatalogStats,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    load_errors: Vec<LoadFailure>,
}

pub fn stats_cmd(catalog: CatalogArgs, output: OutputArgs) -> i32 {
    let loaded = match load_catalog(&catalog) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    print_result(
        output.format,
        output.quiet,
        &StatsResult {
            spec_dir: catalog.spec_dir,
            stats: loaded.stats(),
            load_errors: loaded.load_errors().to_vec(),
        },
    );
    exit_codes::SUCCESS
}

#[derive(Serialize)]
struct CheckResult {
    ok: bool,
    operations: usize,
    tools: usize,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<LoadFailure>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    warnings: Vec<String>,
}

/// Exits with `VALIDATION_FAILED` when any spec file was skipped.
pub fn check_cmd(catalog: CatalogArgs, output: OutputArgs) -> i32 {
    let ctx = match offline_context(&catalog) {
        Ok(c) => c,
        Err(e) => {
            print_error(output.format, output.quiet, &e.to_string());
            return exit_codes::RUNTIME_ERROR;
        }
    };
    let loaded = ctx.catalog();
    let result = CheckResult {
        ok: loaded.load_errors().is_empty(),
        operations: loaded.len(),
        tools: ctx.registry().len(),
        errors: loaded.load_errors().to_vec(),
        warnings: loaded.warnings().to_vec(),
    };
    print_result(output.format, output.quiet, &result);
    if result.ok {
        exit_codes::SUCCESS
    } else {
        exit_codes::VALIDATION_FAILED
    }
}
