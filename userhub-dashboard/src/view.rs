//! Plain-text rendering of users for the terminal

use crate::types::{Pagination, StatusFilter, User};
use std::fmt::Write;

/// Account counts for a set of users
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserStats {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
}

impl UserStats {
    pub fn from_users(users: &[User]) -> Self {
        let active = users.iter().filter(|u| u.is_active).count();
        Self {
            total: users.len(),
            active,
            inactive: users.len() - active,
        }
    }
}

/// Narrows an already fetched list by search term and status
///
/// The term matches first name, last name or e-mail, case-insensitively.
pub fn filter_users<'a>(users: &'a [User], search: &str, status: StatusFilter) -> Vec<&'a User> {
    let term = search.trim().to_lowercase();

    users
        .iter()
        .filter(|user| status.matches(user))
        .filter(|user| {
            term.is_empty()
                || user.first_name.to_lowercase().contains(&term)
                || user.last_name.to_lowercase().contains(&term)
                || user.email.to_lowercase().contains(&term)
        })
        .collect()
}

fn status_label(user: &User) -> &'static str {
    if user.is_active {
        "Active"
    } else {
        "Inactive"
    }
}

/// Renders users as an aligned table
pub fn render_table(users: &[&User]) -> String {
    if users.is_empty() {
        return "No users found\n".to_string();
    }

    let headers = ["ID", "Name", "Email", "Status", "Created"];
    let rows: Vec<[String; 5]> = users
        .iter()
        .map(|user| {
            [
                user.id.to_string(),
                user.full_name(),
                user.email.clone(),
                status_label(user).to_string(),
                user.created_at.format("%Y-%m-%d").to_string(),
            ]
        })
        .collect();

    let mut widths = headers.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_row = |cells: &[String]| {
        let line: Vec<String> = cells
            .iter()
            .zip(widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect();
        let _ = writeln!(out, "{}", line.join("  ").trim_end());
    };

    push_row(headers.map(str::to_string).as_slice());
    push_row(widths.map(|w| "-".repeat(w)).as_slice());
    for row in &rows {
        push_row(row.as_slice());
    }

    out
}

pub fn render_stats(stats: &UserStats) -> String {
    format!(
        "Total: {}  Active: {}  Inactive: {}",
        stats.total, stats.active, stats.inactive
    )
}

pub fn render_pagination(pagination: &Pagination) -> String {
    let mut line = format!(
        "Page {} of {} ({} users)",
        pagination.current_page,
        pagination.total_pages.max(1),
        pagination.total_items
    );
    if pagination.has_previous_page {
        line.push_str("  [prev]");
    }
    if pagination.has_next_page {
        line.push_str("  [next]");
    }
    line
}

/// Multi-line detail view of one user
pub fn render_user(user: &User) -> String {
    format!(
        "ID:       {}\nName:     {}\nEmail:    {}\nStatus:   {}\nCreated:  {}\nUpdated:  {}\n",
        user.id,
        user.full_name(),
        user.email,
        status_label(user),
        user.created_at.to_rfc3339(),
        user.updated_at.to_rfc3339(),
    )
}
