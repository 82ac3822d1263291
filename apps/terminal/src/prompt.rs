//! Text rendering and input parsing for the interactive prompt.

use shared::{
    domain::{Dataset, SessionState, Step},
    protocol::{EntryCommand, Notice, NoticeLevel},
};

pub const TITLE: &str = "Cadastro de Bens por Bloco";

pub const HELP: &str = "\
Comandos:
  0            finaliza o bloco atual
  1            finaliza tudo e gera o arquivo TXT
  /exportar    gera o TXT dos dados já salvos
  /reiniciar   reinicia o cadastro mantendo os dados salvos
  /apagar      apaga TODOS os dados salvos
  /sair        encerra o programa
  /ajuda       mostra esta ajuda";

pub const ERASE_CONFIRMATION: &str = "Tem certeza que deseja apagar TODOS os dados salvos (incluindo os de sessões anteriores)? Esta ação é irreversível! (s/N) ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptInput {
    Command(EntryCommand),
    Help,
    Quit,
}

/// Lines starting with `/` are reserved for front-end commands.
pub fn parse_input(line: &str) -> PromptInput {
    let line = line.strip_suffix('\r').unwrap_or(line);

    match line.trim().to_lowercase().as_str() {
        "/exportar" => PromptInput::Command(EntryCommand::RequestReport),
        "/apagar" => PromptInput::Command(EntryCommand::EraseAll),
        "/reiniciar" => PromptInput::Command(EntryCommand::Restart),
        "/sair" => PromptInput::Quit,
        "/ajuda" => PromptInput::Help,
        _ => PromptInput::Command(EntryCommand::submit(line)),
    }
}

pub fn is_confirmation(answer: &str) -> bool {
    matches!(
        answer.trim().to_lowercase().as_str(),
        "s" | "sim" | "y" | "yes"
    )
}

pub fn prompt_label(session: &SessionState) -> &'static str {
    if session.finished {
        return "> ";
    }
    match session.step {
        Step::AwaitingBlock => "Bloco: ",
        Step::AwaitingItem => "Tombamento do Bem: ",
    }
}

pub fn render_status(session: &SessionState, dataset: &Dataset) -> String {
    let mut lines = Vec::new();

    if session.finished {
        lines.push(
            "Você pode encerrar com /sair, recomeçar com /reiniciar ou apagar tudo com /apagar."
                .to_string(),
        );
        return lines.join("\n");
    }

    match session.step {
        Step::AwaitingBlock => {
            lines.push("Digite o Bloco para começar.".to_string());
            if !dataset.is_empty() {
                lines.push(format!(
                    "Existem {} bloco(s) salvo(s) de sessões anteriores. Use /exportar para gerar o TXT dos dados existentes.",
                    dataset.len()
                ));
            }
        }
        Step::AwaitingItem => {
            lines.push(format!("Bloco Atual: {}", session.current_block_name));
            lines.push(
                "Digite o Tombamento, ou 0 para ir para o próximo bloco, ou 1 para finalizar tudo."
                    .to_string(),
            );
            if session.has_open_items() {
                lines.push("Tombamentos para este Bloco:".to_string());
                for item in &session.current_items {
                    lines.push(format!("  - {item}"));
                }
            }
        }
    }

    lines.join("\n")
}

pub fn render_notice(notice: &Notice) -> String {
    match notice.level {
        NoticeLevel::Info => notice.text.clone(),
        NoticeLevel::Warning => format!("Aviso: {}", notice.text),
        NoticeLevel::Error => format!("Erro: {}", notice.text),
    }
}

#[cfg(test)]
#[path = "tests/prompt_tests.rs"]
mod tests;
