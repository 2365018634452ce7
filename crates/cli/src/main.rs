//! `expedient` -- interactive record-annotation console.
//!
//! Connects to the expedient backend, steps through the record collection,
//! and autosaves annotation edits through the deferred sync engine. File
//! previews are pushed to the configured external viewer.
//!
//! # Environment variables
//!
//! | Variable            | Required | Default                 | Description                     |
//! |---------------------|----------|-------------------------|---------------------------------|
//! | `EXPEDIENT_API_URL` | no       | `http://localhost:8000` | Backend base URL                |
//! | `EXPEDIENT_SCHEMA`  | no       | --                      | Path to a schema JSON file      |
//!
//! An optional positional argument names the record id to resume at.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use expedient_client::{ApiConfig, HttpApi};
use expedient_core::keys::FocusContext;
use expedient_core::render::{Control, RenderedField};
use expedient_core::schema::{default_schema, FieldSchema};
use expedient_sync::RecordBrowser;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "expedient=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env();
    tracing::info!(base_url = %config.base_url, "Loaded API configuration");

    let schema = load_schema(&config);
    let api = Arc::new(HttpApi::new(&config));

    let browser = match RecordBrowser::new(api.clone(), api, schema) {
        Ok(browser) => browser,
        Err(e) => {
            tracing::error!(error = %e, "Invalid annotation schema");
            std::process::exit(1);
        }
    };

    let initial_id = std::env::args().nth(1);
    if let Err(e) = browser.start(initial_id).await {
        tracing::error!(error = %e, "Failed to reach the backend");
        std::process::exit(1);
    }

    let (_, total) = browser.position();
    if total == 0 {
        println!("The record collection is empty.");
        return;
    }
    println!("Connected; {total} records. Type `help` for commands.");
    print_info(&browser);

    repl(&browser).await;
}

/// Load the deployment schema file, falling back to the built-in default.
fn load_schema(config: &ApiConfig) -> Vec<FieldSchema> {
    let Some(path) = &config.schema_path else {
        tracing::info!("No schema configured; using the default annotation schema");
        return default_schema();
    };
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            tracing::error!(path, error = %e, "Failed to read schema file");
            std::process::exit(1);
        }
    };
    match serde_json::from_str(&raw) {
        Ok(schema) => {
            tracing::info!(path, "Loaded annotation schema");
            schema
        }
        Err(e) => {
            tracing::error!(path, error = %e, "Schema file is not valid JSON");
            std::process::exit(1);
        }
    }
}

// ---------------------------------------------------------------------------
// Command loop
// ---------------------------------------------------------------------------

async fn repl(browser: &RecordBrowser) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let (command, rest) = match line.split_once(' ') {
            Some((command, rest)) => (command, rest.trim()),
            None => (line, ""),
        };

        match command {
            "quit" | "q" | "exit" => break,
            "help" => print_help(),
            "next" | "n" => {
                browser.next().await;
                print_info(browser);
            }
            "prev" | "p" => {
                browser.previous().await;
                print_info(browser);
            }
            "goto" => match rest.parse::<usize>() {
                Ok(position) => {
                    browser.goto_position(position).await;
                    print_info(browser);
                }
                Err(_) => println!("usage: goto <position>"),
            },
            "id" => {
                if rest.is_empty() {
                    println!("usage: id <record-id>");
                } else {
                    browser.goto_id(&rest.to_string()).await;
                    print_info(browser);
                }
            }
            "show" => match rest.parse::<usize>() {
                Ok(position) => {
                    if !browser.select_file_position(position) {
                        println!("No file at position {position}.");
                    }
                }
                Err(_) => println!("usage: show <position>"),
            },
            "file" => {
                if !browser.select_file(rest) {
                    println!("No active record.");
                }
            }
            "set" => match rest.split_once(' ') {
                Some((label, value)) => {
                    browser.set_field(label, serde_json::Value::String(value.to_string()));
                }
                None => println!("usage: set <label> <value>"),
            },
            "del" => {
                if rest.is_empty() {
                    println!("usage: del <label>");
                } else {
                    browser.delete_field(rest);
                }
            }
            "key" => {
                if rest.is_empty() {
                    println!("usage: key <k>");
                } else {
                    browser.handle_key(rest, FocusContext::Outside).await;
                    print_info(browser);
                }
            }
            "form" => print_form(&browser.render_form()),
            "info" => print_info(browser),
            // A bare key press: route through the shortcut dispatcher so
            // digits select files and bound keys answer fields.
            key if rest.is_empty() => {
                browser.handle_key(key, FocusContext::Outside).await;
                print_info(browser);
            }
            _ => println!("Unknown command; type `help`."),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_help() {
    println!(
        "\
next/prev       step through records (also PageDown/PageUp)
goto <n>        jump to the record at position n
id <record-id>  jump to a record by id
show <n>        preview the file at position n
file <name>     preview a file by name
set <label> <v> store an annotation value
del <label>     clear an annotation value
key <k>         route a key through the shortcut map
form            print the annotation form
info            print the current record
<key>           a single key routes through the shortcut map
quit            leave"
    );
}

fn print_info(browser: &RecordBrowser) {
    let (position, total) = browser.position();
    match browser.current_record() {
        Some(record) => {
            let saving = if browser.is_saving() { " [saving]" } else { "" };
            println!("[{position}/{total}] {} — {}{saving}", record.id, record.name);
            for (index, file) in record.files.iter().enumerate() {
                println!("  {}. {file}", index + 1);
            }
        }
        None => println!("[{position}/{total}] (record unavailable)"),
    }
}

fn print_form(fields: &[RenderedField]) {
    for field in fields {
        let shown = match &field.control {
            Control::TextBox { value, .. } => value.clone(),
            Control::NumberBox { value } => {
                value.map(|n| n.to_string()).unwrap_or_default()
            }
            Control::DateBox { value } => value.clone(),
            Control::SelectBox { options, selected }
            | Control::ChoiceGroup { options, selected } => {
                let choices: Vec<String> = options
                    .iter()
                    .map(|option| match &option.key {
                        Some(key) => format!("{} ({key})", option.value),
                        None => option.value.clone(),
                    })
                    .collect();
                format!(
                    "{} | {}",
                    selected.as_deref().unwrap_or("-- Select --"),
                    choices.join(", ")
                )
            }
            Control::TextArea { value, .. } => value.clone(),
            Control::Checkbox { checked } => checked.to_string(),
            Control::FilePicker { file_name } => {
                file_name.clone().unwrap_or_default()
            }
            Control::ColorSwatch { value } => value.clone(),
        };
        let marker = if field.required { "*" } else { " " };
        println!("{marker} {}: {shown}", field.label);
    }
}
