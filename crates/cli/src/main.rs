use std::io::{self, Write};

use anyhow::{Context, Result};
use bloom_agents::{AdvisoryAgent, AskInput};
use bloom_core::{ConversationSession, Role, SensitivityProfile};
use bloom_observability::{init_tracing, AppMetrics};
use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "bloom")]
#[command(about = "Bloom pollen and allergy advisory CLI")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Args)]
struct Selection {
    #[arg(long, env = "BLOOM_ZONE")]
    zone: String,
    #[arg(long, env = "BLOOM_SENSITIVITY", default_value = "medium")]
    sensitivity: String,
}

impl Selection {
    fn sensitivity(&self) -> Result<SensitivityProfile> {
        SensitivityProfile::parse(&self.sensitivity).with_context(|| {
            format!(
                "invalid --sensitivity value {:?}; expected low, medium, high or respiratory",
                self.sensitivity
            )
        })
    }
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List every zone in registry order.
    Zones,
    /// Print the alert for a zone.
    Alert {
        #[command(flatten)]
        selection: Selection,
    },
    /// Ask a single question.
    Ask {
        #[command(flatten)]
        selection: Selection,
        question: String,
    },
    /// Interactive chat against one zone.
    Chat {
        #[command(flatten)]
        selection: Selection,
    },
}

fn main() -> Result<()> {
    init_tracing("bloom_cli");
    let cli = Cli::parse();
    let agent = AdvisoryAgent::seeded(AppMetrics::shared());

    match cli.command {
        Command::Zones => {
            println!("{}", serde_json::to_string_pretty(agent.list_zones())?);
        }
        Command::Alert { selection } => {
            let alert = agent.alert(&selection.zone, selection.sensitivity()?)?;
            println!("{}", serde_json::to_string_pretty(&alert)?);
        }
        Command::Ask {
            selection,
            question,
        } => {
            let mut session = ConversationSession::new();
            let input = AskInput {
                zone: selection.zone.clone(),
                sensitivity: selection.sensitivity()?,
                text: question,
            };
            if let Some(reply) = agent.ask(&mut session, &input)? {
                println!("{}", reply.reply_text);
            }
        }
        Command::Chat { selection } => run_chat(&agent, &selection)?,
    }

    Ok(())
}

fn run_chat(agent: &AdvisoryAgent, selection: &Selection) -> Result<()> {
    let sensitivity = selection.sensitivity()?;
    let current = agent.alert(&selection.zone, sensitivity)?;
    let mut session = ConversationSession::new();

    println!(
        "BloomWatch chat for {} ({}). type 'exit' to quit, '/transcript' to review.",
        current.zone.name,
        sensitivity.label()
    );
    println!("{}: {}", current.alert.headline, current.alert.pollen_summary);
    if let Some(notice) = current.alert.special_notice.as_deref() {
        println!("SPECIAL NOTICE: {notice}");
    }

    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }

        let message = line.trim();
        if message.eq_ignore_ascii_case("exit") || message.eq_ignore_ascii_case("quit") {
            break;
        }

        if message == "/transcript" {
            print_transcript(&session);
            continue;
        }

        let input = AskInput {
            zone: selection.zone.clone(),
            sensitivity,
            text: message.to_string(),
        };

        if let Some(reply) = agent.ask(&mut session, &input)? {
            println!("\n{}\n", reply.reply_text);
        }
    }

    Ok(())
}

fn print_transcript(session: &ConversationSession) {
    if session.is_empty() {
        println!("(no turns yet)");
        return;
    }

    for turn in session.turns() {
        let speaker = match turn.role {
            Role::User => "you",
            Role::Assistant => "bloomwatch",
        };
        println!("[{}] {}: {}", turn.at.format("%H:%M:%S"), speaker, turn.text);
    }
}
