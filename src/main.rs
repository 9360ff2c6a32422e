use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use dialoguer::{Input, Password, Select};
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{path::PathBuf, sync::Arc};
use webchat_client::{
    config::{load_config, validate_config},
    logging::init_logging,
    terminal::{TerminalAlerter, TerminalTranscript},
    view::{Alerter, CredentialForm, FormFields, Location, TextInput},
    ApiClient, Backend, ChatFlow, ChatSettings, FormKind, FormOutcome, FormSettings, LoginFlow,
    PageHandles, RegisterFlow,
};

#[derive(Parser, Debug)]
#[command(name = "webchat", about = "Log in, register and chat with a webchat server")]
struct Cli {
    /// Config file (defaults to ~/.config/webchat-client/config.json)
    #[arg(long)]
    config: Option<PathBuf>,

    #[arg(long)]
    base_url: Option<String>,

    #[arg(long)]
    log_level: Option<String>,
}

const MENU: [&str; 5] = ["🔑 Log in", "📝 Register", "💬 Chat", "🚪 Log out", "❌ Quit"];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = load_config(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
        validate_config(&config)?;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("webchat-client");
    let _logger = init_logging(&config.log_level, &log_dir)?;
    log::info!("webchat starting against {}", config.base_url);

    let api = ApiClient::from_config(&config)?;
    let alerter: Arc<dyn Alerter> = Arc::new(TerminalAlerter);
    let location = Arc::new(Location::new());
    let page = PageHandles {
        alerter: alerter.clone(),
        navigator: location.clone(),
    };

    let fields = Arc::new(FormFields::new());
    let form: Arc<dyn CredentialForm> = fields.clone();
    let login = LoginFlow::attach(
        Some(form.clone()),
        api.clone(),
        page.clone(),
        FormSettings::from_config(FormKind::Login, &config),
    )
    .context("login form unavailable")?;
    let register = RegisterFlow::attach(
        Some(form),
        api.clone(),
        page,
        FormSettings::from_config(FormKind::Register, &config),
    )
    .context("registration form unavailable")?;

    let input = Arc::new(TextInput::new());
    let chat = ChatFlow::new(
        api.clone(),
        input.clone(),
        Arc::new(TerminalTranscript),
        ChatSettings::from_config(&config),
    )
    .with_alerter(alerter);

    println!("{}", format!("Connected to {}", api.base_url()).dimmed());

    loop {
        let choice = Select::new()
            .with_prompt("webchat")
            .items(&MENU)
            .default(0)
            .interact()?;

        let outcome = match choice {
            0 => {
                prompt_credentials(&fields)?;
                login.submit().await
            }
            1 => {
                prompt_credentials(&fields)?;
                register.submit().await
            }
            2 => {
                run_chat(&chat, &input).await?;
                continue;
            }
            3 => {
                match api.logout().await {
                    Ok(status) => log::info!("Logout answered {}", status),
                    Err(e) => println!("{} {}", "error:".red(), e),
                }
                println!("{}", "Logged out.".dimmed());
                continue;
            }
            _ => break,
        };

        match outcome {
            Ok(FormOutcome::Redirected(route)) => {
                if api.landing_page(&route).await.unwrap_or(false) {
                    run_chat(&chat, &input).await?;
                } else {
                    println!("{}", "No session yet. Log in to continue.".dimmed());
                }
            }
            Ok(FormOutcome::Alerted(_)) => {}
            Err(e) => println!("{} {}", "error:".red(), e),
        }
    }

    Ok(())
}

fn prompt_credentials(fields: &FormFields) -> anyhow::Result<()> {
    let username: String = Input::new()
        .with_prompt("Username")
        .allow_empty(true)
        .interact_text()?;
    let password = Password::new()
        .with_prompt("Password")
        .allow_empty_password(true)
        .interact()?;
    fields.fill(username, password);
    Ok(())
}

async fn run_chat<B: Backend>(chat: &ChatFlow<B>, input: &TextInput) -> anyhow::Result<()> {
    println!("{}", "Type a message, /back to return to the menu.".dimmed());
    let mut editor = DefaultEditor::new()?;

    loop {
        match editor.readline("→ ") {
            Ok(line) => {
                if line.trim() == "/back" {
                    break;
                }
                let _ = editor.add_history_entry(line.as_str());
                input.set(line);
                if let Err(e) = chat.send_message().await {
                    println!("{} {}", "error:".red(), e);
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}
