pub mod handlers;

use crate::presentation::cli::{Cli, Commands};
use clap::Parser;
use ocean_core::error::Result;

pub async fn run() -> Result<()> {
    let cli = Cli::parse();
    let cfg = handlers::config_from_args(&cli.global)?;
    match cli.command {
        Commands::Upload { paths, recursive } => {
            handlers::handle_upload(&cfg, paths, recursive).await
        }
        Commands::UploadForm { form } => handlers::handle_upload_form(&cfg, form).await,
        Commands::Submit {
            form,
            no_error_popups,
            no_message_popups,
        } => handlers::handle_submit(&cfg, form, no_error_popups, no_message_popups).await,
        Commands::TimeOffset {
            timestamp,
            source_offset,
            target_offset,
        } => handlers::handle_time_offset(&timestamp, &source_offset, &target_offset),
        Commands::Select {
            values,
            clicks,
            select_all,
            submit,
            field,
        } => handlers::handle_select(&cfg, values, clicks, select_all, submit, field).await,
    }
}
