//! Interactive command loop against one confirmed instance.
//!
//! Deliberately thin: every command is a single request to the service's
//! own API (`api/tags`, `api/ps`, `api/show`, `api/chat`), printed through the
//! terminal helpers. Errors end the command, never the loop.

use std::io::{self, Write};

use colored::*;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use probr_core::probe::ServiceProbe;

use crate::terminal::{colors, print};

pub struct Shell<'a> {
    probe: &'a ServiceProbe,
    endpoint: String,
}

#[derive(Deserialize)]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
    #[serde(default)]
    digest: String,
    #[serde(default)]
    size: u64,
    #[serde(default)]
    size_vram: u64,
    #[serde(default)]
    details: Option<ModelDetails>,
}

#[derive(Deserialize, Default, Clone)]
struct ModelDetails {
    #[serde(default)]
    family: String,
    #[serde(default)]
    format: String,
    #[serde(default)]
    parameter_size: String,
    #[serde(default)]
    quantization_level: String,
}

#[derive(Serialize)]
struct ShowRequest<'a> {
    model: &'a str,
}

#[derive(Deserialize, Default)]
struct ShowPayload {
    #[serde(default)]
    license: String,
    #[serde(default)]
    parameters: String,
    #[serde(default)]
    template: String,
    #[serde(default)]
    details: Option<ModelDetails>,
}

#[derive(Serialize, Deserialize, Clone)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

impl<'a> Shell<'a> {
    pub fn new(probe: &'a ServiceProbe, endpoint: String) -> Self {
        Self { probe, endpoint }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        print::header("interactive shell");
        self.help();

        loop {
            let line = match read_line(&format!("{} ", "probr>".color(colors::PRIMARY).bold())) {
                Some(line) => line,
                None => break,
            };

            let mut parts = line.split_whitespace();
            let Some(command) = parts.next() else {
                continue;
            };

            let result = match command {
                "list" => self.list().await,
                "ps" => self.ps().await,
                "show" => match parts.next() {
                    Some(model) => self.show(model).await,
                    None => {
                        warn!("usage: show <model>");
                        Ok(())
                    }
                },
                "use" => match parts.next() {
                    Some(model) => self.chat(model).await,
                    None => {
                        warn!("usage: use <model>");
                        Ok(())
                    }
                },
                "version" => self.version().await,
                "help" => {
                    self.help();
                    Ok(())
                }
                "exit" | "quit" => break,
                other => {
                    warn!("unknown command '{}', try 'help'", other);
                    Ok(())
                }
            };

            if let Err(e) = result {
                warn!("{}", e);
            }
        }

        info!("leaving the shell");
        print::end_of_program();
        Ok(())
    }

    fn help(&self) {
        print::print_status("list ............ models hosted by the instance");
        print::print_status("ps .............. models currently loaded");
        print::print_status("show <model> .... details of a hosted model");
        print::print_status("use <model> ..... chat with a hosted model");
        print::print_status("version ......... service version");
        print::print_status("exit ............ leave the shell");
    }

    async fn list(&self) -> anyhow::Result<()> {
        let list = self.get_models("api/tags").await?;
        if list.models.is_empty() {
            warn!("the instance hosts no models");
            return Ok(());
        }

        for (idx, model) in list.models.iter().enumerate() {
            print::tree_head(idx, &model.name);
            let details = model.details.clone().unwrap_or_default();
            print::as_tree_one_level(vec![
                ("ID".to_string(), short_digest(&model.digest).normal()),
                ("Size".to_string(), human_size(model.size).green()),
                ("Format".to_string(), details.format.clone().magenta()),
                ("Params".to_string(), details.parameter_size.clone().blue()),
                ("Quant".to_string(), details.quantization_level.clone().red()),
            ]);
        }
        Ok(())
    }

    async fn ps(&self) -> anyhow::Result<()> {
        let list = self.get_models("api/ps").await?;
        if list.models.is_empty() {
            warn!("no models are loaded right now");
            return Ok(());
        }

        for (idx, model) in list.models.iter().enumerate() {
            print::tree_head(idx, &model.name);
            print::as_tree_one_level(vec![
                ("ID".to_string(), short_digest(&model.digest).normal()),
                ("VRAM".to_string(), human_size(model.size_vram).blue()),
            ]);
        }
        Ok(())
    }

    /// Read-only model detail view via `api/show`.
    async fn show(&self, model: &str) -> anyhow::Result<()> {
        let url = format!("{}api/show", self.endpoint);
        let payload: ShowPayload = self
            .probe
            .client()
            .post(&url)
            .json(&ShowRequest { model })
            .send()
            .await?
            .json()
            .await?;

        print::tree_head(0, model);
        print::as_tree_one_level(
            show_rows(&payload)
                .into_iter()
                .map(|(key, value)| (key, value.normal()))
                .collect(),
        );
        Ok(())
    }

    async fn version(&self) -> anyhow::Result<()> {
        #[derive(Deserialize)]
        struct VersionPayload {
            version: String,
        }

        let url = format!("{}api/version", self.endpoint);
        let payload: VersionPayload = self.probe.client().get(&url).send().await?.json().await?;
        info!("service reports version {}", payload.version);
        Ok(())
    }

    /// Chat loop against one model. `clear` resets the history, `exit`
    /// returns to the shell.
    async fn chat(&self, model: &str) -> anyhow::Result<()> {
        info!("connected to {}, 'exit' returns to the shell", model);

        let mut messages: Vec<ChatMessage> = vec![ChatMessage {
            role: "system".to_string(),
            content: "You are a helpful assistant".to_string(),
        }];

        loop {
            let input = match read_line(&format!("{} ", "you>".color(colors::ACCENT).bold())) {
                Some(input) => input,
                None => break,
            };
            let input = input.trim();

            match input {
                "" => continue,
                "exit" | "quit" => break,
                "clear" => {
                    messages.truncate(1);
                    info!("history cleared");
                    continue;
                }
                _ => {}
            }

            messages.push(ChatMessage {
                role: "user".to_string(),
                content: input.to_string(),
            });

            let url = format!("{}api/chat", self.endpoint);
            let request = ChatRequest {
                model,
                messages: &messages,
                stream: false,
            };

            let response = self.send_chat(&url, &request).await;
            let response = match response {
                Ok(response) => response,
                Err(e) => {
                    warn!("chat request failed: {}", e);
                    messages.pop();
                    continue;
                }
            };

            print::print(&format!(
                "{} {}",
                "model>".color(colors::PRIMARY).bold(),
                response.message.content
            ));
            messages.push(response.message);
        }

        Ok(())
    }

    async fn send_chat(
        &self,
        url: &str,
        request: &ChatRequest<'_>,
    ) -> Result<ChatResponse, reqwest::Error> {
        self.probe
            .client()
            .post(url)
            .json(request)
            .send()
            .await?
            .json()
            .await
    }

    async fn get_models(&self, path: &str) -> anyhow::Result<ModelList> {
        let url = format!("{}{}", self.endpoint, path);
        let list: ModelList = self.probe.client().get(&url).send().await?.json().await?;
        Ok(list)
    }
}

/// Flattens the `api/show` payload into displayable rows, skipping fields
/// the instance left empty. License and template bodies shrink to their
/// first line; full dumps belong in the service's own UI, not here.
fn show_rows(payload: &ShowPayload) -> Vec<(String, String)> {
    let mut rows = Vec::new();

    if let Some(details) = &payload.details {
        for (key, value) in [
            ("Family", &details.family),
            ("Format", &details.format),
            ("Params", &details.parameter_size),
            ("Quant", &details.quantization_level),
        ] {
            if !value.is_empty() {
                rows.push((key.to_string(), value.clone()));
            }
        }
    }

    if let Some(first) = payload.license.lines().next() {
        rows.push(("License".to_string(), first.trim().to_string()));
    }
    if let Some(first) = payload.template.lines().find(|l| !l.trim().is_empty()) {
        rows.push(("Template".to_string(), first.trim().to_string()));
    }
    if let Some(first) = payload.parameters.lines().next() {
        rows.push(("Options".to_string(), first.trim().to_string()));
    }

    rows
}

fn short_digest(digest: &str) -> String {
    if digest.is_empty() {
        "N/A".to_string()
    } else {
        digest.chars().take(12).collect()
    }
}

fn human_size(bytes: u64) -> String {
    const GIB: u64 = 1024 * 1024 * 1024;
    const MIB: u64 = 1024 * 1024;
    if bytes >= GIB {
        format!("{:.2}GB", bytes as f64 / GIB as f64)
    } else {
        format!("{:.2}MB", bytes as f64 / MIB as f64)
    }
}

/// Blocking prompt read. Returns None on EOF.
fn read_line(prompt: &str) -> Option<String> {
    print!("{prompt}");
    let _ = io::stdout().flush();

    let mut line = String::new();
    match io::stdin().read_line(&mut line) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(line.trim().to_string()),
    }
}
