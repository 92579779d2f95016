use clap::Parser;

mod args;
mod cmd;
mod commands;
mod exit_codes;
mod logging;
mod output;

pub use args::*;
use commands::Command;
use toolsmith_core::SearchQuery;

#[derive(Debug, Parser)]
#[command(name = "toolsmith", version, about = "OpenAPI operations as callable tools")]
struct Cli {
    /// Log at info level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            eprintln!("error: failed to create tokio runtime: {e}");
            std::process::exit(exit_codes::RUNTIME_ERROR);
        }
    };

    let exit_code = rt.block_on(run_command(cli.command));
    std::process::exit(exit_code);
}

async fn run_command(command: Command) -> i32 {
    match command {
        Command::Tools {
            product,
            method,
            tags,
            paginated,
            text,
            limit,
            schemas,
            catalog,
            output,
        } => {
            let query = SearchQuery {
                product,
                method,
                tags,
                paginated: paginated.then_some(true),
                text,
                limit,
            };
            cmd::tools::tools_cmd(query, schemas, catalog, output)
        }
        Command::Describe {
            name,
            catalog,
            output,
        } => cmd::tools::describe_cmd(&name, catalog, output),
        Command::Stats { catalog, output } => cmd::stats::stats_cmd(catalog, output),
        Command::Check { catalog, output } => cmd::stats::check_cmd(catalog, output),
        Command::Invoke {
            name,
            args,
            args_file,
            catalog,
            exec,
            output,
        } => {
            cmd::invoke::invoke_cmd(&name, args.as_deref(), args_file.as_deref(), catalog, exec, output)
                .await
        }
        Command::Request {
            method,
            path,
            query,
            headers,
            body,
            catalog,
            exec,
            output,
        } => {
            let request = cmd::invoke::RawRequest {
                method,
                path,
                query,
                headers,
                body,
            };
            cmd::invoke::request_cmd(request, catalog, exec, output).await
        }
    }
}
