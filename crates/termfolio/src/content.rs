//! The portfolio's commands and the static text each one shows.

use chrono::{DateTime, Local, TimeZone};
use ratatui::text::{Line, Span};

use crate::theme::{StyleTag, Theme};

/// Which menu section a command is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Portfolio,
    System,
}

impl Category {
    /// Heading used in the menu.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Portfolio => "Portfolio Commands:",
            Category::System => "System Commands:",
        }
    }
}

/// One selectable portfolio command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    About,
    Skills,
    Experience,
    Links,
    Help,
    Date,
    Whoami,
}

impl Entry {
    /// Every command, in menu order.
    pub const ALL: [Entry; 7] = [
        Entry::About,
        Entry::Skills,
        Entry::Experience,
        Entry::Links,
        Entry::Help,
        Entry::Date,
        Entry::Whoami,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Entry::About => "about",
            Entry::Skills => "skills",
            Entry::Experience => "experience",
            Entry::Links => "links",
            Entry::Help => "help",
            Entry::Date => "date",
            Entry::Whoami => "whoami",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Entry::About => "Learn about me",
            Entry::Skills => "View my technical skills",
            Entry::Experience => "View my work experience",
            Entry::Links => "View my social links",
            Entry::Help => "Show all available commands",
            Entry::Date => "Display current date and time",
            Entry::Whoami => "Display current user info",
        }
    }

    pub fn category(&self) -> Category {
        match self {
            Entry::About | Entry::Skills | Entry::Experience | Entry::Links => {
                Category::Portfolio
            }
            Entry::Help | Entry::Date | Entry::Whoami => Category::System,
        }
    }

    /// The command's output, styled with `theme`. `date` reads the local
    /// clock.
    pub fn render(&self, theme: &Theme) -> Vec<Line<'static>> {
        match self {
            Entry::About => about(theme),
            Entry::Skills => skills(theme),
            Entry::Experience => experience(theme),
            Entry::Links => links(theme),
            Entry::Help => help(theme),
            Entry::Date => date(theme, &Local::now()),
            Entry::Whoami => whoami(theme),
        }
    }
}

const HEADER_WIDTH: usize = 60;

/// A double-ruled box around `title`, followed by a blank line.
fn header(theme: &Theme, title: &str) -> Vec<Line<'static>> {
    let inner = HEADER_WIDTH - 2;
    let text = format!("  {title}");
    let pad = inner.saturating_sub(text.chars().count());
    vec![
        Line::from(theme.styled(format!("╔{}╗", "═".repeat(inner)), StyleTag::Title)),
        Line::from(theme.styled(format!("║{text}{}║", " ".repeat(pad)), StyleTag::Title)),
        Line::from(theme.styled(format!("╚{}╝", "═".repeat(inner)), StyleTag::Title)),
        Line::raw(""),
    ]
}

fn field(theme: &Theme, label: &str, value: &str) -> Line<'static> {
    Line::from(vec![
        theme.styled(format!("{label} "), StyleTag::Label),
        theme.styled(value.to_string(), StyleTag::Value),
    ])
}

fn paragraph(theme: &Theme, tag: StyleTag, rows: &[&str]) -> Vec<Line<'static>> {
    rows.iter()
        .map(|row| Line::from(theme.styled(row.to_string(), tag)))
        .collect()
}

fn about(theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = header(theme, "ABOUT ME");
    lines.push(field(theme, "Name:", "John Doe"));
    lines.push(field(theme, "Role:", "Full Stack Developer & Tech Enthusiast"));
    lines.push(field(theme, "Location:", "San Francisco, CA"));
    lines.push(Line::raw(""));
    lines.extend(paragraph(
        theme,
        StyleTag::Body,
        &[
            "Hello! I'm a passionate developer who loves building",
            "innovative web applications and exploring cutting-edge",
            "technologies. With expertise in both frontend and backend",
            "development, I create seamless digital experiences that",
            "make a difference.",
        ],
    ));
    lines.push(Line::raw(""));
    lines.extend(paragraph(
        theme,
        StyleTag::Accent,
        &[
            "When I'm not coding, you'll find me contributing to open",
            "source projects, mentoring aspiring developers, or diving",
            "into the latest tech trends.",
        ],
    ));
    lines.push(Line::raw(""));
    lines.push(Line::from(theme.styled(
        "Open 'skills' or 'experience' to learn more about my background.",
        StyleTag::Dim,
    )));
    lines
}

const SKILLS: [(&str, &str, &str); 5] = [
    ("Frontend", "React, Vue.js, TypeScript", "Next.js, Astro, Tailwind CSS"),
    ("Backend", "Node.js, Python, Go", "Express, FastAPI, PostgreSQL"),
    ("DevOps & Tools", "Docker, Kubernetes, AWS", "Git, CI/CD, Terraform"),
    ("Databases", "PostgreSQL, MongoDB, Redis", "GraphQL, REST APIs"),
    ("Other", "WebSockets, WebAssembly", "Testing, Agile, TDD"),
];

fn skills(theme: &Theme) -> Vec<Line<'static>> {
    const LEFT: usize = 22;
    const RIGHT: usize = 32;
    let rule = |l: &str, m: &str, r: &str| {
        Line::from(theme.styled(
            format!("{l}{}{m}{}{r}", "─".repeat(LEFT + 2), "─".repeat(RIGHT + 2)),
            StyleTag::TableBorder,
        ))
    };
    let row = |left: &str, left_tag: StyleTag, right: &str, right_tag: StyleTag| {
        Line::from(vec![
            theme.styled("│ ", StyleTag::TableBorder),
            theme.styled(format!("{left:<LEFT$}"), left_tag),
            theme.styled(" │ ", StyleTag::TableBorder),
            theme.styled(format!("{right:<RIGHT$}"), right_tag),
            theme.styled(" │", StyleTag::TableBorder),
        ])
    };

    let mut lines = header(theme, "TECHNICAL SKILLS");
    lines.push(rule("┌", "┬", "┐"));
    lines.push(row(
        "Category",
        StyleTag::TableHeader,
        "Technologies",
        StyleTag::TableHeader,
    ));
    for (category, first, second) in SKILLS {
        lines.push(rule("├", "┼", "┤"));
        lines.push(row(category, StyleTag::Body, first, StyleTag::Body));
        lines.push(row("", StyleTag::Body, second, StyleTag::Body));
    }
    lines.push(rule("└", "┴", "┘"));
    lines.push(Line::raw(""));
    lines.push(Line::from(theme.styled(
        "★ Proficiency Level: Expert ████████░░ (80%)",
        StyleTag::Accent,
    )));
    lines
}

const JOBS: [(&str, &str, &str, &str); 3] = [
    (
        "Senior Full Stack Developer",
        "Tech Innovators Inc.",
        "2021 - Present",
        "Leading development of cloud-native applications, mentoring junior developers.",
    ),
    (
        "Full Stack Developer",
        "StartupXYZ",
        "2019 - 2021",
        "Built scalable microservices architecture, implemented CI/CD pipelines.",
    ),
    (
        "Junior Developer",
        "WebDev Solutions",
        "2017 - 2019",
        "Developed responsive web applications, collaborated on agile teams.",
    ),
];

fn experience(theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = header(theme, "WORK EXPERIENCE");
    for (idx, (role, company, period, summary)) in JOBS.into_iter().enumerate() {
        if idx > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(theme.styled(role, StyleTag::Label)));
        lines.push(Line::from(vec![
            theme.styled(company, StyleTag::Value),
            Span::raw(" | "),
            theme.styled(period, StyleTag::Dim),
        ]));
        lines.push(Line::from(theme.styled(summary, StyleTag::Body)));
    }
    lines
}

const LINKS: [(&str, &str, &str); 5] = [
    ("⚡", "GitHub", "github.com/yourusername"),
    ("💼", "LinkedIn", "linkedin.com/in/yourprofile"),
    ("🐦", "Twitter", "twitter.com/yourhandle"),
    ("📧", "Email", "your.email@example.com"),
    ("🌐", "Website", "yourwebsite.com"),
];

fn links(theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = header(theme, "SOCIAL LINKS");
    for (icon, name, url) in LINKS {
        lines.push(Line::from(vec![
            Span::raw(format!("{icon} ")),
            theme.styled(format!("{name}: "), StyleTag::Label),
            theme.styled(url, StyleTag::Value),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(theme.styled("Feel free to reach out!", StyleTag::Dim)));
    lines
}

/// The command listing. Key bindings are appended by the program, which
/// owns them.
fn help(theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = header(theme, "AVAILABLE COMMANDS");
    for (idx, (category, label)) in [
        (Category::Portfolio, "Portfolio:"),
        (Category::System, "System:"),
    ]
    .into_iter()
    .enumerate()
    {
        if idx > 0 {
            lines.push(Line::raw(""));
        }
        lines.push(Line::from(theme.styled(label, StyleTag::Label)));
        for entry in Entry::ALL.iter().filter(|e| e.category() == category) {
            lines.push(Line::from(vec![
                Span::raw("  "),
                theme.styled(format!("{:<12}", entry.name()), StyleTag::Value),
                Span::raw(" "),
                theme.styled(entry.description(), StyleTag::Body),
            ]));
        }
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(theme.styled("Navigation Tips:", StyleTag::Dim)));
    lines
}

fn date<Tz: TimeZone>(theme: &Theme, now: &DateTime<Tz>) -> Vec<Line<'static>>
where
    Tz::Offset: std::fmt::Display,
{
    vec![
        field(theme, "Date:", &now.format("%A, %B %-d, %Y").to_string()),
        field(theme, "Time:", &now.format("%H:%M:%S %Z").to_string()),
    ]
}

fn whoami(theme: &Theme) -> Vec<Line<'static>> {
    vec![
        Line::from(theme.styled("SSH User:", StyleTag::Label)),
        Line::from(theme.styled("guest@genar.me", StyleTag::Value)),
    ]
}
