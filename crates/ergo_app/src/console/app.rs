use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use ergo_link::{Channel, LazyLink, Session};
use ergo_logging::{ergo_debug, ergo_info};

use super::input::{parse_line, ConsoleAction};
use super::render::Renderer;
use super::typeahead::{suggestions, CHAT_VOCABULARY, SLASH_VOCABULARY};
use crate::config::ConsoleConfig;

/// How long the loop waits for typed input before polling the link again.
const POLL_INTERVAL: Duration = Duration::from_millis(50);

const HELP: &str = "\
Type text to chat. Conventions: project <path>, resume, analyze, reset.
  /yes, /no            answer the pending confirmation
  /project <path>      switch project
  /resume, /reset      run the matching backend command
  /cmd <name> k=v ...  send a structured command
  /clear, /clearlog    clear messages or the log
  /suggest <prefix>    list completions (or type the prefix followed by ?)
  /status              show connection, workflow and progress
  /quit                leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub fn run(config: &ConsoleConfig) -> anyhow::Result<()> {
    let mut session = Session::with_limits(
        LazyLink::new(config.link_settings()),
        config.store_limits(),
    );
    session.channel().get()?;

    let (line_tx, line_rx) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if line_tx.send(line).is_err() {
                break;
            }
        }
    });

    let mut renderer = Renderer::new(config.show_log);
    let mut out = io::stdout();
    writeln!(out, "Connecting to {} (type /help)", config.server_url)?;

    loop {
        while let Some(event) = session.channel().try_recv() {
            session.handle_link_event(event);
        }

        let flow = match line_rx.recv_timeout(POLL_INTERVAL) {
            Ok(line) => apply_action(&mut session, parse_line(&line), &mut out)?,
            Err(RecvTimeoutError::Timeout) => Flow::Continue,
            Err(RecvTimeoutError::Disconnected) => {
                ergo_debug!("stdin closed");
                Flow::Quit
            }
        };

        let changes = session.state_mut().consume_changes();
        if !changes.is_empty() {
            for line in renderer.render(session.state(), &changes) {
                writeln!(out, "{line}")?;
            }
            out.flush()?;
        }

        if flow == Flow::Quit {
            break;
        }
    }

    ergo_info!("Console closed");
    Ok(())
}

/// Carries out one parsed input line. Feedback for local problems (offline,
/// nothing to confirm) is printed to `out`; nothing is sent in those cases.
pub fn apply_action<C: Channel>(
    session: &mut Session<C>,
    action: ConsoleAction,
    out: &mut impl Write,
) -> io::Result<Flow> {
    let online = session.state().is_connected();
    match action {
        ConsoleAction::Nothing => {}
        ConsoleAction::Quit => return Ok(Flow::Quit),
        ConsoleAction::Send(_) | ConsoleAction::Answer(_) | ConsoleAction::Command { .. }
            if !online =>
        {
            writeln!(out, "(offline: not sent)")?;
        }
        ConsoleAction::Send(text) => session.send_input(text),
        ConsoleAction::Answer(accepted) => match session.state().pending_confirmation().cloned() {
            Some(request) => session.send_confirm_response(request, accepted),
            None => writeln!(out, "(nothing to confirm)")?,
        },
        ConsoleAction::Command { name, fields } => session.send_command(name, fields),
        ConsoleAction::ClearMessages => session.clear_messages(),
        ConsoleAction::ClearLog => session.clear_log(),
        ConsoleAction::Suggest(prefix) => {
            let vocabulary = if prefix.starts_with('/') {
                SLASH_VOCABULARY
            } else {
                CHAT_VOCABULARY
            };
            let found = suggestions(&prefix, vocabulary);
            if found.is_empty() {
                writeln!(out, "(no suggestions)")?;
            } else {
                writeln!(out, "{}", found.join("  "))?;
            }
        }
        ConsoleAction::Status => {
            let view = session.state().view();
            writeln!(out, "{}", view.header())?;
            if let Some(status) = &view.status {
                writeln!(out, "  … {}", status.summary())?;
            }
            if let Some(pipeline) = &view.pipeline_status {
                writeln!(out, "  last pipeline: {pipeline}")?;
            }
        }
        ConsoleAction::Help => writeln!(out, "{HELP}")?,
        ConsoleAction::Unknown(head) => {
            let hint = suggestions(&head, SLASH_VOCABULARY);
            if hint.is_empty() {
                writeln!(out, "unknown command {head}; try /help")?;
            } else {
                writeln!(out, "unknown command {head}; did you mean {}?", hint.join(", "))?;
            }
        }
    }
    Ok(Flow::Continue)
}
