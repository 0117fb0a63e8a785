//! Interactive first-run setup.

use {
    crate::config::{
        Config, DEFAULT_COMMENT_BUTTON_IMAGE, DEFAULT_COMMENT_FILE, DEFAULT_NEXT_BUTTON_IMAGE,
    },
    anyhow::bail,
    std::{
        io::{self, BufRead, Write},
        path::{Path, PathBuf},
    },
    tracing::info,
};

/// Asks the operator for every setting and returns the resulting configuration.
pub fn run_setup(input: &mut impl BufRead, output: &mut impl Write) -> anyhow::Result<Config> {
    writeln!(output, "Welcome to autocomment setup!")?;
    let webhook_url = prompt(input, output, "Enter your Discord webhook URL: ")?;
    let debugging = prompt(input, output, "Enable debugging mode? (y/n): ")?
        .eq_ignore_ascii_case("y");
    let comment_file = prompt_path(
        input,
        output,
        "Enter the path to the comment file",
        DEFAULT_COMMENT_FILE,
    )?;
    let comment_button_image = prompt_path(
        input,
        output,
        "Enter the path to the comment button image",
        DEFAULT_COMMENT_BUTTON_IMAGE,
    )?;
    let next_button_image = prompt_path(
        input,
        output,
        "Enter the path to the next video button image",
        DEFAULT_NEXT_BUTTON_IMAGE,
    )?;
    Ok(Config {
        webhook_url,
        debugging,
        comment_file,
        comment_button_image,
        next_button_image,
        ..Config::default()
    })
}

/// Runs the setup on the terminal and writes the result to `path`.
pub fn setup_to_file(path: &Path) -> anyhow::Result<Config> {
    let config = run_setup(&mut io::stdin().lock(), &mut io::stdout())?;
    config.save(path)?;
    info!("configuration saved to {:?}", path);
    Ok(config)
}

fn prompt(
    input: &mut impl BufRead,
    output: &mut impl Write,
    question: &str,
) -> anyhow::Result<String> {
    write!(output, "{question}")?;
    output.flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input ended before setup was complete");
    }
    Ok(line.trim().to_owned())
}

fn prompt_path(
    input: &mut impl BufRead,
    output: &mut impl Write,
    question: &str,
    default: &str,
) -> anyhow::Result<PathBuf> {
    let answer = prompt(input, output, &format!("{question} (default: {default}): "))?;
    Ok(if answer.is_empty() {
        default.into()
    } else {
        answer.into()
    })
}
