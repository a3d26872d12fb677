//! Command line interface definition.

use clap::{crate_version, App, Arg};

/// Generates the command line interface.
pub fn generate_cli() -> App<'static, 'static> {
    App::new("Stack Analyzer")
        .version(crate_version!())
        .about(
            "Detects the platform and the third party libraries of decompiled Android \
             applications",
        )
        .arg(
            Arg::with_name("package")
                .help(
                    "The package name of the application to analyze. Its decompiled tree must \
                     be in the dist folder",
                )
                .value_name("PACKAGE")
                .required(true)
                .multiple(true)
                .takes_value(true),
        )
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .conflicts_with("quiet")
                .help("If you'd like the auditor to talk more than necessary"),
        )
        .arg(
            Arg::with_name("quiet")
                .short("q")
                .long("quiet")
                .conflicts_with("verbose")
                .help("If you'd like a zen auditor that won't output anything but warnings"),
        )
        .arg(
            Arg::with_name("force")
                .long("force")
                .help("If you'd like to force the analysis to overwrite existing reports"),
        )
        .arg(
            Arg::with_name("bench")
                .long("bench")
                .help("Shows benchmarks for the analysis"),
        )
        .arg(
            Arg::with_name("open")
                .long("open")
                .help("Opens the report once the analysis is finished"),
        )
        .arg(
            Arg::with_name("threads")
                .short("t")
                .long("threads")
                .value_name("THREADS")
                .takes_value(true)
                .help("Number of applications analyzed at the same time"),
        )
        .arg(
            Arg::with_name("dist")
                .long("dist")
                .value_name("FOLDER")
                .takes_value(true)
                .help("Folder with the decompiled applications, one folder per package"),
        )
        .arg(
            Arg::with_name("results")
                .long("results")
                .value_name("FOLDER")
                .takes_value(true)
                .help("Folder where the reports will be stored"),
        )
        .arg(
            Arg::with_name("libraries")
                .long("libraries")
                .value_name("FILE")
                .takes_value(true)
                .help("JSON file with the catalog of known libraries"),
        )
}
