use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen, size as terminal_size};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use ratatui::Terminal;
use std::io;
use std::time::Duration;
use crate::tui::{App, Layout, Mode, Tab};
use crate::tui::error::TuiError;
use crate::tui::widgets::confirm_delete::OPTIONS as DELETE_OPTIONS;
use crate::tui::widgets::editor::Editor;
use crate::tui::app::TaskField;
use crate::utils::{has_primary_modifier, matches_binding};

/// Guard that ensures terminal state is restored even on panic.
/// If the terminal is left in raw mode or the alternate screen, the user's
/// shell is unusable until they run `reset`.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;

        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    /// Restore on normal exit; the guard does nothing on drop afterwards
    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        // Already on a cleanup path, errors have nowhere to go
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

pub async fn run_event_loop(mut app: App) -> Result<(), TuiError> {
    // Check size before entering the alternate screen so the message stays visible
    let (width, height) = terminal_size()?;
    let min_width_with_border = Layout::MIN_WIDTH + 2;
    let min_height_with_border = Layout::MIN_HEIGHT + 2;

    if width < min_width_with_border || height < min_height_with_border {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width_with_border, min_height_with_border
        )));
    }

    let mut guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)?;

    app.reload().await;

    loop {
        app.check_status_message_timeout();

        let terminal_size = terminal.size()?;
        let terminal_rect = Rect::new(0, 0, terminal_size.width, terminal_size.height);
        terminal.draw(|f| {
            let layout = Layout::calculate(terminal_rect);
            crate::tui::render::render(f, &mut app, &layout);
        })?;

        // Only Press events; Windows also reports Release
        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key_event) = event::read()? {
                if key_event.kind == KeyEventKind::Press && handle_key_event(&mut app, key_event).await? {
                    break;
                }
            }
        }
    }

    guard.restore()?;

    Ok(())
}

/// Dispatch a key press by mode; returns true when the user asked to quit
pub async fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    // Ctrl+C always quits, whatever is open
    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key_event.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Ok(true);
    }

    match app.ui.mode {
        Mode::View => handle_view_mode(app, key_event).await,
        Mode::Form => handle_form_mode(app, key_event).await.map(|_| false),
        Mode::Filter => handle_filter_mode(app, key_event).await.map(|_| false),
        Mode::Help => handle_help_mode(app, key_event).map(|_| false),
        Mode::ConfirmDelete => {
            handle_delete_confirmation_modal(app, key_event).await;
            Ok(false)
        }
    }
}

fn bound(binding: &str, key_event: &KeyEvent) -> Result<bool, TuiError> {
    matches_binding(binding, key_event).map_err(TuiError::KeyBindingError)
}

async fn handle_view_mode(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = app.config.key_bindings.clone();

    if bound(&kb.quit, &key_event)? {
        return Ok(true);
    }

    if bound(&kb.help, &key_event)? {
        app.enter_help_mode();
    } else if bound(&kb.new, &key_event)? {
        app.enter_create_mode();
    } else if bound(&kb.edit, &key_event)? {
        app.enter_edit_mode();
    } else if bound(&kb.complete, &key_event)? {
        app.complete_selected().await;
    } else if bound(&kb.delete, &key_event)? {
        app.request_delete();
    } else if bound(&kb.filter, &key_event)? {
        app.enter_filter_mode();
    } else if bound(&kb.refresh, &key_event)? {
        app.reload().await;
    } else if bound(&kb.list_up, &key_event)? || key_event.code == KeyCode::Up {
        app.move_selection_up();
    } else if bound(&kb.list_down, &key_event)? || key_event.code == KeyCode::Down {
        app.move_selection_down();
    } else if bound(&kb.tab_left, &key_event)? || key_event.code == KeyCode::BackTab {
        app.switch_tab(app.ui.current_tab.previous());
    } else if bound(&kb.tab_right, &key_event)? || key_event.code == KeyCode::Tab {
        app.switch_tab(app.ui.current_tab.next());
    } else if bound(&kb.tab_1, &key_event)? {
        app.switch_tab(Tab::Pending);
    } else if bound(&kb.tab_2, &key_event)? {
        app.switch_tab(Tab::Completed);
    } else if bound(&kb.tab_3, &key_event)? {
        app.switch_tab(Tab::All);
    }

    Ok(false)
}

async fn handle_form_mode(app: &mut App, key_event: KeyEvent) -> Result<(), TuiError> {
    if bound(&app.config.key_bindings.save, &key_event)? {
        app.save_form().await;
        return Ok(());
    }

    let Some(form) = app.form.as_mut() else {
        app.exit_form_mode();
        return Ok(());
    };

    match key_event.code {
        KeyCode::Esc => app.exit_form_mode(),
        KeyCode::Tab | KeyCode::Down => form.navigate(true),
        KeyCode::BackTab | KeyCode::Up => form.navigate(false),
        KeyCode::Enter => {
            if form.current_field == TaskField::Time {
                app.save_form().await;
            } else {
                form.navigate(true);
            }
        }
        _ => {
            edit_field(form.current_editor_mut(), &key_event);
        }
    }

    Ok(())
}

async fn handle_filter_mode(app: &mut App, key_event: KeyEvent) -> Result<(), TuiError> {
    match key_event.code {
        KeyCode::Esc => app.exit_filter_mode(),
        KeyCode::Enter => app.apply_filter().await,
        _ => {
            edit_field(&mut app.filter_editor, &key_event);
        }
    }
    Ok(())
}

fn handle_help_mode(app: &mut App, key_event: KeyEvent) -> Result<(), TuiError> {
    if key_event.code == KeyCode::Esc || bound(&app.config.key_bindings.help, &key_event)? {
        app.exit_help_mode();
    }
    Ok(())
}

async fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) {
    let options = DELETE_OPTIONS.len();
    match key_event.code {
        KeyCode::Up => {
            app.delete_modal_selection = (app.delete_modal_selection + options - 1) % options;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.delete_modal_selection = (app.delete_modal_selection + 1) % options;
        }
        KeyCode::Enter => {
            if app.delete_modal_selection == 0 {
                app.confirm_delete().await;
            } else {
                app.cancel_delete();
            }
        }
        KeyCode::Esc => app.cancel_delete(),
        // Everything else is ignored while the modal is open
        _ => {}
    }
}

/// Apply a text-editing key to a single-line field; returns false if the key
/// is not an editing key
fn edit_field(editor: &mut Editor, key_event: &KeyEvent) -> bool {
    let word = has_primary_modifier(key_event.modifiers);
    match key_event.code {
        KeyCode::Char(ch) if !word => editor.insert_char(ch),
        KeyCode::Backspace => editor.delete_char(),
        KeyCode::Delete => editor.delete_forward(),
        KeyCode::Left if word => editor.move_cursor_word_left(),
        KeyCode::Right if word => editor.move_cursor_word_right(),
        KeyCode::Left => editor.move_cursor_left(),
        KeyCode::Right => editor.move_cursor_right(),
        KeyCode::Home => editor.move_cursor_home(),
        KeyCode::End => editor.move_cursor_end(),
        _ => return false,
    }
    true
}
