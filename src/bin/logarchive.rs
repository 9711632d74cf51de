// Copyright 2026 Octave Online LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//    http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use anyhow::Context;
use clap::Parser;
use logarchive::internal;
use logarchive::Archiver;
use logarchive::Config;
use logarchive::ConfigOverrides;
use logarchive::ConflictPolicy;
use logarchive::OsFs;
use std::path::PathBuf;
use std::time::SystemTime;

#[derive(Parser, Debug)]
#[command(version, about = "Compresses aged log files and moves them into an archive directory")]
struct Cli {
	/// Directory scanned for log files. Only files directly inside it are considered.
	#[arg(short, long, value_name = "DIR")]
	source: Option<PathBuf>,

	/// Directory receiving the compressed files. Created if it doesn't exist yet.
	#[arg(short, long, value_name = "DIR")]
	archive: Option<PathBuf>,

	/// Archive files last modified more than this many days ago.
	#[arg(short, long, value_name = "DAYS")]
	days: Option<u64>,

	/// Only archive files whose names end with this, such as ".log".
	#[arg(long)]
	suffix: Option<String>,

	/// gzip compression level.
	#[arg(long, value_parser = clap::value_parser!(u32).range(0..=9))]
	level: Option<u32>,

	/// Fail instead of replacing an archive that already exists.
	#[arg(long)]
	no_clobber: bool,

	/// List the files that would be archived without changing anything.
	#[arg(short = 'n', long)]
	dry_run: bool,

	/// Configuration file. Defaults to logarchive.toml in the working directory, if present.
	#[arg(short, long, value_name = "FILE")]
	config: Option<PathBuf>,

	/// Log every scanned file to stderr.
	#[arg(short, long, conflicts_with = "quiet")]
	verbose: bool,

	/// Only print the summary line and errors.
	#[arg(short, long)]
	quiet: bool,
}

impl Cli {
	fn overrides(&self) -> ConfigOverrides {
		ConfigOverrides {
			source_dir: self.source.clone(),
			archive_dir: self.archive.clone(),
			max_age_days: self.days,
			suffix: self.suffix.clone(),
			on_conflict: self.no_clobber.then_some(ConflictPolicy::Reject),
			compression_level: self.level,
			dry_run: self.dry_run.then_some(true),
		}
	}
}

fn main() -> anyhow::Result<()> {
	let args = Cli::parse();
	internal::init_logging(args.verbose, args.quiet);
	let config = Config::load(args.config.as_deref(), &args.overrides()).context("failed to load configuration")?;
	let archiver = Archiver::new(OsFs, config);
	let summary = archiver
		.run(SystemTime::now(), |record| {
			if !args.quiet {
				println!("{record}");
			}
		})
		.context("archive run aborted")?;
	println!("{summary}");
	Ok(())
}

#[test]
fn test_cli() {
	fn cli(input: &str) -> Result<Cli, String> {
		Cli::try_parse_from(shlex::split(input).unwrap()).map_err(|e| format!("{:?}", e.kind()))
	}
	let args = cli("logarchive").unwrap();
	assert_eq!(args.overrides(), ConfigOverrides::default());

	let args = cli("logarchive -s /var/log/nginx -a /srv/archive -d 14 --suffix .txt --level 9").unwrap();
	let overrides = args.overrides();
	assert_eq!(overrides.source_dir, Some(PathBuf::from("/var/log/nginx")));
	assert_eq!(overrides.archive_dir, Some(PathBuf::from("/srv/archive")));
	assert_eq!(overrides.max_age_days, Some(14));
	assert_eq!(overrides.suffix.as_deref(), Some(".txt"));
	assert_eq!(overrides.compression_level, Some(9));

	let overrides = cli("logarchive --no-clobber -n").unwrap().overrides();
	assert_eq!(overrides.on_conflict, Some(ConflictPolicy::Reject));
	assert_eq!(overrides.dry_run, Some(true));

	insta::assert_snapshot!(cli("logarchive --days soon").unwrap_err(), @"ValueValidation");
	insta::assert_snapshot!(cli("logarchive --level 12").unwrap_err(), @"ValueValidation");
	insta::assert_snapshot!(cli("logarchive -v -q").unwrap_err(), @"ArgumentConflict");
	insta::assert_snapshot!(cli("logarchive /var/log").unwrap_err(), @"UnknownArgument");
}
