// Copyright 2024 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use resc_common::{RescError, Result, StderrDiagnostics};
use resc_compiler::{compile_files, compile_res_dir, CompilerOptions};

/// Compiles a resource tree into linkable .flat artifacts.
///
/// ```
/// $ resc -o compiled.flata --dir app/res
/// $ resc -o out/ res/values/strings.xml res/layout/main.xml
/// ```
#[derive(Parser)]
#[command(name = "resc", version)]
struct Args {
    /// Output archive (.zip/.flata) or directory
    #[arg(short = 'o', value_name = "PATH")]
    output: PathBuf,

    /// Root resource directory; mutually exclusive with FILES
    #[arg(long = "dir", value_name = "PATH")]
    dir: Option<PathBuf>,

    /// Generate en-XA and ar-XB pseudo-locales from default strings
    #[arg(long = "pseudo-localize")]
    pseudo_localize: bool,

    /// Downgrade positional-argument errors in strings to warnings
    #[arg(long)]
    legacy: bool,

    /// Verbose diagnostics
    #[arg(short = 'v')]
    verbose: bool,

    /// Explicit input files
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) if err.use_stderr() => {
            let _ = err.print();
            return ExitCode::from(1);
        }
        Err(help_or_version) => {
            let _ = help_or_version.print();
            return ExitCode::SUCCESS;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if matches!(err, RescError::Cli(_)) {
                eprintln!("usage: resc -o PATH [--pseudo-localize] [--legacy] [-v] (--dir DIR | FILES...)");
            }
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    if args.dir.is_some() && !args.files.is_empty() {
        return Err(RescError::Cli(
            "pass either --dir or explicit input files, not both".into()
        ));
    }
    if args.dir.is_none() && args.files.is_empty() {
        return Err(RescError::Cli("no inputs given".into()));
    }

    let options = CompilerOptions {
        pseudo_localize: args.pseudo_localize,
        legacy: args.legacy,
        ..CompilerOptions::default()
    };
    let mut diag = StderrDiagnostics {
        verbose: args.verbose
    };

    let mut archive = resc_zip::open_output(&args.output)?;
    let compiled = match &args.dir {
        Some(dir) => compile_res_dir(dir, archive.as_mut(), &options, &mut diag),
        None => compile_files(&args.files, archive.as_mut(), &options, &mut diag)
    };
    // Entries written before a failure are still valid; always seal the
    // container so a partial batch is inspectable.
    let finished = archive.finish();
    compiled.and(finished)
}
