//! HTML documents served by the web server.
//!
//! Every page shares the layout produced by [`layout`] and links the single
//! stylesheet served at [`STYLESHEET_PATH`]. Rows are numbered in the order
//! they are given; nothing here sorts.

use std::fmt;

use http::StatusCode;

use crate::{
    domains::{format_timestamp, HighScoreRow, PlayerHistoryRow, PlaytimeRow},
    error::SegmentError,
    http::Document,
};

pub const STYLESHEET_PATH: &str = "/css/styles.css?v=1.0";

const STYLESHEET: &str = "\
h1, p {
    text-align: center;
    font-family: verdana;
}
table, th, td {
    margin-left: auto;
    margin-right: auto;
    border: 1px solid;
    width: 500px;
    text-align: center;
    font-family: verdana;
}
";

/// Informational sentence shown above a table.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Banner {
    GameSaved { name: String },
    GameNotSaved { name: String },
    TableCreated,
    TableExisted,
}

impl fmt::Display for Banner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Banner::GameSaved { name } => write!(
                f,
                "Game data successfully saved in database. Here are the new game stats for {name}:"
            ),
            Banner::GameNotSaved { name } => write!(
                f,
                "Game data could not be saved. Here are the current game stats for {name}:"
            ),
            Banner::TableCreated => f.write_str("Table created! Here is the new high score info:"),
            Banner::TableExisted => f.write_str(
                "The table already existed in the database. Here is the high score info:",
            ),
        }
    }
}

pub fn html_escape(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

fn layout(title: &str, heading: &str, content: &str) -> String {
    format!(
        "\
<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<title>{title}</title>
<link rel=\"stylesheet\" href=\"{STYLESHEET_PATH}\">
</head>
<body>
<h1>{heading}</h1>
{content}</body>
</html>
"
    )
}

fn paragraph(text: &str) -> String {
    format!("<p>{}</p>\n", html_escape(text))
}

fn banner(banner: Option<&Banner>) -> String {
    banner
        .map(|banner| paragraph(&banner.to_string()))
        .unwrap_or_default()
}

/// A table whose first column is the 1-based position of each row.
fn ranked_table(headers: &[&str], rows: impl IntoIterator<Item = Vec<String>>) -> String {
    let mut table = String::from("<table>\n<tr>\n<th></th>\n");
    for header in headers {
        table.push_str(&format!("<th>{header}</th>\n"));
    }
    table.push_str("</tr>\n");

    for (rank, cells) in (1..).zip(rows) {
        table.push_str(&format!("<tr>\n<td>{rank}</td>\n"));
        for cell in cells {
            table.push_str(&format!("<td>{}</td>\n", html_escape(&cell)));
        }
        table.push_str("</tr>\n");
    }

    table.push_str("</table>\n");
    table
}

pub fn home() -> Document {
    const REQUESTS: &[(&str, &str, &str)] = &[
        (
            "/highscores",
            "High scores page",
            "View a list of high scores for each player in the database.",
        ),
        (
            "/scores/Draeden",
            "Player scores page",
            "View a list of all recorded scores for a single player in the database.",
        ),
        (
            "/create",
            "Create a new database",
            "Create a new database if one does not already exist.",
        ),
        (
            "/fancy",
            "Total Play Times",
            "Shows the total minutes played by each player in the database.",
        ),
        (
            "/scores/Draeden/5300/1/1682010830733/1682010843268",
            "Insert data",
            "Insert new data about a game into the database.",
        ),
    ];

    let mut content = paragraph(
        "Welcome to the Agario information database. Here is a list of supported requests:",
    );
    content.push_str("<table>\n");
    for (href, label, description) in REQUESTS {
        content.push_str(&format!(
            "<tr>\n<td><a href=\"{href}\">{label}</a></td>\n<td>{description}</td>\n</tr>\n"
        ));
    }
    content.push_str("</table>\n");

    Document::html(layout("Agario", "Agario", &content))
}

pub fn highscores(rows: &[HighScoreRow], info: Option<&Banner>) -> Document {
    let mut content = banner(info);
    content.push_str(&ranked_table(
        &["Player Name", "High Score"],
        rows.iter()
            .map(|row| vec![row.player_name.clone(), row.best_mass.to_string()]),
    ));

    Document::html(layout("High Scores", "High Scores", &content))
}

pub fn player_scores(name: &str, rows: &[PlayerHistoryRow], info: Option<&Banner>) -> Document {
    let mut content = banner(info);
    content.push_str(&ranked_table(
        &["Max Mass", "Rank", "Start Time", "End Time"],
        rows.iter().map(|row| {
            vec![
                row.max_mass.to_string(),
                row.max_rank.to_string(),
                format_timestamp(&row.start_time),
                format_timestamp(&row.end_time),
            ]
        }),
    ));

    let heading = format!("High Scores of {}", html_escape(name));
    Document::html(layout("Player High Scores", &heading, &content))
}

pub fn playtime(rows: &[PlaytimeRow]) -> Document {
    let content = ranked_table(
        &["Player", "Total Minutes Played"],
        rows.iter()
            .map(|row| vec![row.player_name.clone(), row.total_minutes.to_string()]),
    );

    Document::html(layout("Total Play Times", "Total Play Times", &content))
}

pub fn not_found() -> Document {
    Document::html(layout(
        "Not Found",
        "404",
        &paragraph("Error: Request not found"),
    ))
}

pub fn bad_request(err: &SegmentError) -> Document {
    let mut document = Document::html(layout(
        "Bad Request",
        "400",
        &paragraph(&format!("Error: {err}")),
    ));
    document.status = StatusCode::BAD_REQUEST;
    document
}

pub fn stylesheet() -> Document {
    Document::css(STYLESHEET)
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn table_rows(body: &str) -> usize {
        // The header row is the only one with <th> cells.
        body.matches("<tr>").count() - 1
    }

    #[test]
    fn empty_tables_render() {
        let page = highscores(&[], None);
        assert!(page.body.contains("<table>"));
        assert_eq!(table_rows(&page.body), 0);

        let page = playtime(&[]);
        assert_eq!(table_rows(&page.body), 0);

        let page = player_scores("Nobody", &[], None);
        assert_eq!(table_rows(&page.body), 0);
    }

    #[test]
    fn rows_are_numbered_in_given_order() {
        let rows = [
            HighScoreRow {
                player_name: "Low".into(),
                best_mass: 1.0,
            },
            HighScoreRow {
                player_name: "High".into(),
                best_mass: 99.5,
            },
        ];
        let body = highscores(&rows, None).body;

        let low = body.find("<td>1</td>\n<td>Low</td>\n<td>1</td>").unwrap();
        let high = body.find("<td>2</td>\n<td>High</td>\n<td>99.5</td>").unwrap();
        assert!(low < high);
    }

    #[test]
    fn player_page_shows_banner_and_timestamps() {
        let rows = [PlayerHistoryRow {
            max_mass: 1200.0,
            max_rank: 2,
            start_time: datetime!(1970-01-01 00:00:00),
            end_time: datetime!(1970-01-01 00:01:00),
        }];
        let info = Banner::GameSaved { name: "Ann".into() };
        let body = player_scores("Ann", &rows, Some(&info)).body;

        assert!(body.contains("<h1>High Scores of Ann</h1>"));
        assert!(body.contains(
            "<p>Game data successfully saved in database. Here are the new game stats for Ann:</p>"
        ));
        assert!(body.contains("<td>1970/01/01 00:00:00</td>\n<td>1970/01/01 00:01:00</td>"));
    }

    #[test]
    fn interpolated_text_is_escaped() {
        let rows = [PlaytimeRow {
            player_name: "<script>".into(),
            total_minutes: 3,
        }];
        let body = playtime(&rows).body;
        assert!(body.contains("<td>&lt;script&gt;</td>"));
        assert!(!body.contains("<script>"));

        let body = player_scores("a&b", &[], None).body;
        assert!(body.contains("<h1>High Scores of a&amp;b</h1>"));
    }

    #[test]
    fn stylesheet_is_bare_css() {
        let sheet = stylesheet();
        assert_eq!(sheet.content_type, mime::TEXT_CSS);
        assert!(!sheet.body.contains('<'));
        assert!(sheet.body.starts_with("h1, p {"));
    }

    #[test]
    fn error_documents() {
        assert_eq!(not_found(), not_found());
        assert!(not_found().body.contains("<h1>404</h1>"));

        let page = bad_request(&SegmentError::Rank("x".into()));
        assert_eq!(page.status, StatusCode::BAD_REQUEST);
        assert!(page.body.contains("max rank `x` is not an integer"));
    }

    #[test]
    fn home_links_every_request() {
        let body = home().body;
        for href in ["/highscores", "/scores/Draeden", "/create", "/fancy"] {
            assert!(body.contains(&format!("href=\"{href}\"")), "{href}");
        }
        assert!(body.contains(STYLESHEET_PATH));
    }
}
