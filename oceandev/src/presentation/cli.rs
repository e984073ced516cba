use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about = "oceandev: OCEAN client CLI", long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Server root, e.g. http://localhost:5000
    #[arg(long, global = true, env = "OCEAN_BASE_URL")]
    pub base_url: Option<String>,

    /// Chunk size in bytes for chunked uploads (default 20 MiB)
    #[arg(long, global = true)]
    pub chunk_size: Option<u64>,

    /// Keep-alive ping period while a form upload is in flight
    #[arg(long = "ping-interval-ms", global = true)]
    pub ping_interval_ms: Option<u64>,

    /// Extra attempts per failed chunk
    #[arg(long, global = true)]
    pub retries: Option<u32>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct FormArgs {
    /// form action URL (relative to --base-url or absolute)
    pub url: String,

    #[arg(long, default_value = "POST")]
    pub method: String,

    /// text field as name=value (repeatable)
    #[arg(long = "field")]
    pub fields: Vec<String>,

    /// file field as name=path (repeatable); switches the body to multipart
    #[arg(long = "file")]
    pub files: Vec<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Upload files through /ocean/upload_chunk, one chunk at a time
    Upload {
        paths: Vec<PathBuf>,

        /// upload every regular file below directory arguments
        #[arg(long)]
        recursive: bool,
    },

    /// Upload a whole form in one request with progress and keep-alive pings
    UploadForm {
        #[command(flatten)]
        form: FormArgs,
    },

    /// Submit a form and interpret the {messages, errors, redirect} envelope
    Submit {
        #[command(flatten)]
        form: FormArgs,

        /// do not show server errors
        #[arg(long)]
        no_error_popups: bool,

        /// do not show server messages
        #[arg(long)]
        no_message_popups: bool,
    },

    /// Show a timestamp under its own offset, in GMT and under a second offset
    TimeOffset {
        /// e.g. 2024-03-10T12:00
        timestamp: String,

        /// source offset in minutes east of GMT (e.g. -300)
        #[arg(allow_negative_numbers = true)]
        source_offset: String,

        /// target offset in minutes east of GMT (e.g. 60)
        #[arg(allow_negative_numbers = true)]
        target_offset: String,
    },

    /// Replay checkbox clicks over a list of values
    Select {
        /// comma-separated item values, in display order
        #[arg(value_delimiter = ',')]
        values: Vec<String>,

        /// comma-separated click positions; prefix with `+` for shift-click
        #[arg(long, value_delimiter = ',')]
        clicks: Vec<String>,

        /// put a select-all control at position 0
        #[arg(long)]
        select_all: bool,

        /// submit the selection to this form action
        #[arg(long)]
        submit: Option<String>,

        /// hidden field receiving the comma-joined values
        #[arg(long, default_value = "selected")]
        field: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_negative_offsets_as_values() {
        let cli = Cli::try_parse_from([
            "oceandev",
            "time-offset",
            "2024-03-10T12:00",
            "-300",
            "60",
        ])
        .unwrap();
        match cli.command {
            Commands::TimeOffset {
                source_offset,
                target_offset,
                ..
            } => {
                assert_eq!(source_offset, "-300");
                assert_eq!(target_offset, "60");
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn global_flags_work_after_subcommand() {
        let cli = Cli::try_parse_from([
            "oceandev",
            "upload",
            "a.wav",
            "--chunk-size",
            "1024",
            "--base-url",
            "http://ocean.test",
        ])
        .unwrap();
        assert_eq!(cli.global.chunk_size, Some(1024));
        assert_eq!(cli.global.base_url.as_deref(), Some("http://ocean.test"));
    }

    #[test]
    fn select_splits_values_and_clicks() {
        let cli = Cli::try_parse_from([
            "oceandev", "select", "a,b,c,d", "--clicks", "1,+3", "--select-all",
        ])
        .unwrap();
        match cli.command {
            Commands::Select {
                values,
                clicks,
                select_all,
                ..
            } => {
                assert_eq!(values, vec!["a", "b", "c", "d"]);
                assert_eq!(clicks, vec!["1", "+3"]);
                assert!(select_all);
            }
            _ => panic!("wrong command"),
        }
    }

    #[test]
    fn submit_collects_repeated_fields() {
        let cli = Cli::try_parse_from([
            "oceandev",
            "submit",
            "/ocean/species/add",
            "--field",
            "species_name=Orca",
            "--field",
            "genus=Orcinus",
            "--no-error-popups",
        ])
        .unwrap();
        match cli.command {
            Commands::Submit {
                form,
                no_error_popups,
                no_message_popups,
            } => {
                assert_eq!(form.fields.len(), 2);
                assert_eq!(form.method, "POST");
                assert!(no_error_popups);
                assert!(!no_message_popups);
            }
            _ => panic!("wrong command"),
        }
    }
}
