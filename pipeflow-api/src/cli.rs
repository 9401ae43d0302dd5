// SPDX-FileCopyrightText: 2025 Timothy Pogue
//
// SPDX-License-Identifier: ISC

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[
    clap(
        name = "pipeflow-api",
        version,
        author,
        about = "API server for managing Pipeflow workflow resources"
    )
]
pub struct CliArgs {
    #[clap(subcommand)]
    pub cmd: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[
        clap(
            name = "serve",
            about = "Run the API server"
        )
    ]
    Serve {
        #[clap(long, env = "PIPEFLOW_CONFIG", help = "Path to a configuration file")]
        config: Option<String>,
    },
}
