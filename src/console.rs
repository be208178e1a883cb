//! Line-oriented console front end.
//!
//! Each line is `<actor id> <command> [args...]`. Replies and the actor's
//! surfaces are printed to stdout.

use tokio::io::{AsyncBufReadExt, BufReader};

use parkhub_core::error::{AppError, ErrorKind};
use parkhub_core::result::AppResult;
use parkhub_core::types::id::ActorId;
use parkhub_service::action::{CANCEL_PREFIX, CLEAR, STATISTICS};
use parkhub_service::{ActorContext, ParkingService};
use parkhub_view::MemoryTransport;

const HELP: &str = "\
Usage: <actor> <command> [args]
  start [full name]   subscribe and receive a view
  stop                unsubscribe
  press <place>       reserve, occupy or free a place
  cancel <place>      cancel your reservation
  clear               free the whole lot
  statistics          show statistics
  tap <data>          press a button by its callback data
  show                print your surfaces
  tamper              delete your surfaces behind the service's back
  whitelist           toggle whitelist mode (owner)
  get_stats           export statistics (owner)
  set_stats <json>    import statistics (owner)
  logs [n]            last n log lines (owner)
Type 'help' for this text, 'quit' to exit.";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    Start(Option<String>),
    Stop,
    Tap(String),
    Show,
    Tamper,
    Whitelist,
    GetStats,
    SetStats(String),
    Logs(Option<usize>),
}

/// Parse `<actor> <command> [args]`.
pub(crate) fn parse(line: &str) -> AppResult<(ActorId, Command)> {
    let mut words = line.split_whitespace();
    let actor = words
        .next()
        .ok_or_else(|| AppError::validation("Missing actor id"))?;
    let command = words
        .next()
        .ok_or_else(|| AppError::validation("Missing command"))?;
    let rest: Vec<&str> = words.collect();
    let rest = rest.join(" ");

    let argument = |what: &str| -> AppResult<String> {
        if rest.is_empty() {
            Err(AppError::validation(format!("'{command}' needs {what}")))
        } else {
            Ok(rest.clone())
        }
    };

    let command = match command {
        "start" => Command::Start((!rest.is_empty()).then(|| rest.clone())),
        "stop" => Command::Stop,
        "press" => Command::Tap(argument("a place id")?),
        "cancel" => Command::Tap(format!("{CANCEL_PREFIX}{}", argument("a place id")?)),
        "clear" => Command::Tap(CLEAR.to_string()),
        "statistics" => Command::Tap(STATISTICS.to_string()),
        "tap" => Command::Tap(argument("callback data")?),
        "show" => Command::Show,
        "tamper" => Command::Tamper,
        "whitelist" => Command::Whitelist,
        "get_stats" => Command::GetStats,
        "set_stats" => Command::SetStats(rest.clone()),
        "logs" => Command::Logs(if rest.is_empty() {
            None
        } else {
            Some(rest.parse().map_err(|_| {
                AppError::validation(format!("'{rest}' is not a line count"))
            })?)
        }),
        other => return Err(AppError::validation(format!("Unknown command '{other}'"))),
    };

    Ok((ActorId::from(actor), command))
}

/// Read commands from stdin until EOF, `quit` or Ctrl+C.
pub async fn run(service: &ParkingService, transport: &MemoryTransport) -> AppResult<()> {
    println!("{HELP}");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        };
        let Some(line) = line else { break };
        let line = line.trim();

        match line {
            "" => continue,
            "quit" | "exit" => break,
            "help" => {
                println!("{HELP}");
                continue;
            }
            _ => {}
        }

        match parse(line) {
            Ok((actor, command)) => {
                if let Err(e) = execute(service, transport, actor, command).await {
                    print_error(&e);
                }
            }
            Err(e) => print_error(&e),
        }
    }

    Ok(())
}

async fn execute(
    service: &ParkingService,
    transport: &MemoryTransport,
    actor: ActorId,
    command: Command,
) -> AppResult<()> {
    let mut ctx = ActorContext::new(actor.clone());
    if let Some(name) = service.directory().name(&actor).await {
        ctx = ctx.with_full_name(name);
    }

    match command {
        Command::Start(name) => {
            if let Some(name) = name {
                ctx = ctx.with_full_name(name);
            }
            service.start(&ctx).await?;
            show(transport, &actor);
        }
        Command::Stop => println!("{}", service.stop(&ctx).await?),
        Command::Tap(data) => {
            println!("✓ {}", service.handle_callback(&ctx, &data).await?);
            show(transport, &actor);
        }
        Command::Show => show(transport, &actor),
        Command::Tamper => {
            let removed = transport.remove_actor_surfaces(&actor);
            println!("Removed {removed} surface(s) of {actor}");
        }
        Command::Whitelist => {
            let enabled = service.toggle_whitelist(&ctx).await?;
            println!("Whitelist mode: {enabled}");
        }
        Command::GetStats => println!("{}", service.export_stats(&ctx).await?),
        Command::SetStats(json) => {
            service.import_stats(&ctx, &json).await?;
            println!("✓ Statistics imported");
        }
        Command::Logs(lines) => {
            for chunk in service.logs(&ctx, lines).await? {
                println!("{chunk}");
            }
        }
    }

    Ok(())
}

fn show(transport: &MemoryTransport, actor: &ActorId) {
    let surfaces = transport.surfaces_for(actor);
    if surfaces.is_empty() {
        println!("({actor} has no surfaces)");
        return;
    }

    for surface in surfaces {
        println!("── {} [{}]", actor, surface.id);
        println!("{}", surface.text);
        if let Some(keyboard) = &surface.keyboard {
            for row in &keyboard.rows {
                let captions: Vec<String> = row
                    .iter()
                    .map(|b| format!("[{}]({})", b.caption, b.callback))
                    .collect();
                println!("  {}", captions.join(" "));
            }
        }
    }
}

fn print_error(err: &AppError) {
    match err.kind {
        ErrorKind::Authorization => println!("⚠ Ignored: {}", err.message),
        ErrorKind::NoOp => println!("⚠ Nothing to do: {}", err.message),
        _ => println!("✗ {}", err),
    }
}
