//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes. Which handler runs is decided by the route
//! guard: nothing but quitting while the session is restoring, the login
//! form when signed out, and the dashboard otherwise.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use portfolio_cms_core::auth::GuardDecision;

use crate::app::{can_add_email_char, can_add_password_char, App, AppState, LoginFocus, Tab, PAGE_SCROLL_SIZE};

/// Handle keyboard input. Returns true if the app should quit.
pub fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.guard_decision() {
        GuardDecision::Loading => {
            if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                app.state = AppState::Quitting;
                return Ok(true);
            }
            Ok(false)
        }
        GuardDecision::Render(_) => handle_dashboard_input(app, key),
        GuardDecision::Redirect(_) | GuardDecision::NotFound => Ok(handle_login_input(app, key)),
    }
}

fn handle_dashboard_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::EditingForm => {
            handle_form_input(app, key);
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingLogout => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.logout(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.state = AppState::Normal,
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => return Ok(handle_quit_confirmation(app, key)),
        AppState::Normal | AppState::Quitting => {}
    }

    // Global keys
    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('L') => app.state = AppState::ConfirmingLogout,
        KeyCode::Char(c @ '1'..='6') => {
            let index = c as usize - '1' as usize;
            app.current_tab = Tab::ALL[index];
        }
        KeyCode::Left => app.current_tab = app.current_tab.prev(),
        KeyCode::Right | KeyCode::Tab => app.current_tab = app.current_tab.next(),
        KeyCode::BackTab => app.current_tab = app.current_tab.prev(),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Home => app.select_first(),
        KeyCode::End => app.select_last(),
        KeyCode::Char('u') => {
            app.status_message = None;
            app.refresh_tab(app.current_tab);
        }
        KeyCode::Char('n') => app.open_new_form(),
        KeyCode::Char('e') | KeyCode::Enter => app.open_edit_form(),
        KeyCode::Char('d') | KeyCode::Delete => app.request_delete(),
        KeyCode::Char('r') if app.current_tab == Tab::Messages => app.toggle_selected_message(),
        KeyCode::Char('a') if app.current_tab == Tab::Messages => app.archive_selected_message(),
        KeyCode::Esc => app.status_message = None,
        _ => {}
    }
    Ok(false)
}

fn handle_quit_confirmation(app: &mut App, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
            app.state = AppState::Quitting;
            true
        }
        _ => {
            app.state = AppState::Normal;
            false
        }
    }
}

fn handle_form_input(app: &mut App, key: KeyEvent) {
    let Some(form) = app.form.as_mut() else {
        app.state = AppState::Normal;
        return;
    };
    match key.code {
        KeyCode::Esc => app.cancel_form(),
        KeyCode::Down | KeyCode::Tab => form.next_input(),
        KeyCode::Up | KeyCode::BackTab => form.prev_input(),
        KeyCode::Enter => {
            if form.is_last_input() {
                app.submit_form();
            } else {
                form.next_input();
            }
        }
        KeyCode::Backspace => form.pop_char(),
        KeyCode::Char(c) => form.push_char(c),
        _ => {}
    }
}

fn handle_login_input(app: &mut App, key: KeyEvent) -> bool {
    if matches!(app.state, AppState::ConfirmingQuit) {
        return handle_quit_confirmation(app, key);
    }

    match key.code {
        KeyCode::Esc => {
            app.state = AppState::ConfirmingQuit;
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            // Enter in the password field submits, like a web form
            LoginFocus::Password | LoginFocus::Button => app.attempt_login(),
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    false
}
