use colored::Colorize;
use frontdesk::commands::status::StatusReport;
use frontdesk::commands::{CmdMessage, MemberView, MessageLevel};
use frontdesk::model::Session;
use unicode_width::UnicodeWidthStr;

const CHECKED_MARKER: &str = "✓";

pub(crate) fn print_messages(messages: &[CmdMessage]) {
    for message in messages {
        match message.level {
            MessageLevel::Info => println!("{}", message.content.dimmed()),
            MessageLevel::Success => println!("{}", message.content.green()),
            MessageLevel::Warning => println!("{}", message.content.yellow()),
            MessageLevel::Error => println!("{}", message.content.red()),
        }
    }
}

pub(crate) fn print_members(members: &[MemberView]) {
    if members.is_empty() {
        println!("No memberships found.");
        return;
    }

    let name_width = column_width(members.iter().map(|m| m.name.as_str()), 4);
    let phone_width = column_width(members.iter().map(|m| m.phone.as_str()), 5);

    for member in members {
        let index = format!("#{}", member.index);
        let marker = if member.checked_in {
            format!(" {}", CHECKED_MARKER.green())
        } else {
            String::new()
        };
        let state = if member.expired {
            format!(" {}", "expired".red())
        } else {
            String::new()
        };
        let history = if member.latest {
            format!("{}x", member.loyalty)
        } else {
            "older row".dimmed().to_string()
        };

        println!(
            "{:>5}  {}{}  {}{}  {}{}{}",
            index.yellow(),
            member.name.bold(),
            pad_to(&member.name, name_width),
            member.phone,
            pad_to(&member.phone, phone_width),
            history,
            marker,
            state,
        );
        if !member.plan.is_empty() || !member.note.is_empty() {
            let mut detail = member.plan.clone();
            if !member.note.is_empty() {
                if !detail.is_empty() {
                    detail.push_str("  ");
                }
                detail.push_str(&member.note);
            }
            println!("       {}", detail.dimmed());
        }
    }
}

pub(crate) fn print_status(report: &StatusReport) {
    let mut line = String::new();
    if let Some(stage) = &report.stage {
        line.push_str(&format!("{}: ", stage));
    }
    if report.pending > 0 {
        line.push_str(&format!(
            "Saving {} {}, ",
            report.pending,
            plural(report.pending, "change", "changes")
        ));
    }
    line.push_str(&format!(
        "{} {} checked in ({} {} and {} new)",
        report.total_today,
        plural(report.total_today, "person", "people"),
        report.members_today,
        plural(report.members_today, "member", "members"),
        report.new_today,
    ));

    if report.session == Session::SignedOut {
        println!("{}", line.yellow());
    } else {
        println!("{}", line);
    }
}

fn plural<'a>(n: usize, one: &'a str, many: &'a str) -> &'a str {
    if n == 1 { one } else { many }
}

fn column_width<'a>(values: impl Iterator<Item = &'a str>, min: usize) -> usize {
    values.map(|v| v.width()).chain(std::iter::once(min)).max().unwrap_or(min)
}

fn pad_to(value: &str, width: usize) -> String {
    " ".repeat(width.saturating_sub(value.width()))
}
