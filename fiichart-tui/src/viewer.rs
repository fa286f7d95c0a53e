//! Blocking full-screen viewer for a single figure.

use std::io::{self, stdout};
use std::sync::Once;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use fiichart_core::{ChartDisplay, Figure, PipelineError};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::chart_panel::FigurePanel;
use crate::theme::Theme;

/// Shows a figure in the alternate screen until the user dismisses it.
pub struct TerminalViewer {
    theme: Theme,
}

impl TerminalViewer {
    pub fn new() -> Self {
        Self {
            theme: Theme::default(),
        }
    }

    fn run(&self, figure: &Figure) -> Result<()> {
        install_panic_hook();
        enable_raw_mode()?;
        let mut stdout = stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e.into());
        }
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;

        let result = self.event_loop(&mut terminal, figure);

        // Restore even when the loop failed; report the loop error first.
        let restored = restore(&mut terminal);
        result.and(restored)
    }

    fn event_loop(
        &self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        figure: &Figure,
    ) -> Result<()> {
        terminal.clear()?;
        loop {
            terminal.draw(|f| {
                f.render_widget(FigurePanel::new(figure, &self.theme), f.area());
            })?;

            // 50ms poll keeps resizes responsive.
            if event::poll(Duration::from_millis(50))? {
                if let Event::Key(key) = event::read()? {
                    if is_dismiss(&key) {
                        return Ok(());
                    }
                }
            }
        }
    }
}

impl Default for TerminalViewer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChartDisplay for TerminalViewer {
    fn show(&mut self, figure: &Figure) -> Result<(), PipelineError> {
        self.run(figure)
            .map_err(|e| PipelineError::Display(format!("{e:#}")))
    }
}

static PANIC_HOOK: Once = Once::new();

/// Chain a terminal-restoring hook in front of the current panic hook, once
/// per process.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let default_hook = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stderr(), LeaveAlternateScreen);
            default_hook(info);
        }));
    });
}

fn restore(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Keys that close the viewer: q, Esc, Enter, or Ctrl-C.
fn is_dismiss(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc | KeyCode::Enter => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventState;

    fn press(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_panic_hook_installs_once() {
        let _first = TerminalViewer::new();
        let _second = TerminalViewer::new();
        assert!(!PANIC_HOOK.is_completed());

        install_panic_hook();
        install_panic_hook();
        assert!(PANIC_HOOK.is_completed());
    }

    #[test]
    fn test_dismiss_keys() {
        assert!(is_dismiss(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_dismiss(&press(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_dismiss(&press(KeyCode::Enter, KeyModifiers::NONE)));
        assert!(is_dismiss(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
    }

    #[test]
    fn test_other_keys_keep_viewer_open() {
        assert!(!is_dismiss(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_dismiss(&press(KeyCode::Char('x'), KeyModifiers::NONE)));
        assert!(!is_dismiss(&press(KeyCode::Left, KeyModifiers::NONE)));
    }

    #[test]
    fn test_key_release_is_ignored() {
        let release = KeyEvent {
            code: KeyCode::Enter,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Release,
            state: KeyEventState::NONE,
        };
        assert!(!is_dismiss(&release));
    }
}
