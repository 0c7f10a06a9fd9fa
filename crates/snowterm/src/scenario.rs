//! The greeting card script
//!
//! One strictly sequential coroutine driving a [`Terminal`]. Every line the
//! script later touches again is addressed through the handle returned when
//! it was written.

use anyhow::Result;
use snowterm_terminal::{
    Color, LineId, Matcher, OnMismatch, Spinner, Style, Terminal, TerminalError,
    DEFAULT_SPINNER_INTERVAL, DEFAULT_TYPING_DELAY, PROMPT,
};
use std::time::Duration;
use tracing::{info, warn};

use crate::{
    config::{CardConfig, IdentityPolicy},
    effects::Effects,
};

pub const PERMITTED_NAMES: [&str; 21] = [
    "Лиза",
    "Елизавета",
    "Лизавета",
    "Лизонька",
    "Лизочка",
    "Лизка",
    "Лизуня",
    "Лизетта",
    "Lisa",
    "Liza",
    "Elizabeth",
    "Liz",
    "Lizzy",
    "Lizzie",
    "Eliza",
    "Beth",
    "Betsy",
    "Bess",
    "Betty",
    "Ellie",
    "Libby",
];

pub const ACCESS_DENIED: &str = "Доступ разрешён только для Лизы";
pub const EPILOGUE_HINT: &str = "Удерживай пробел, чтобы остановить прокрутку";

const CODE_STYLE: Style = Style::block().with_color(Color::Rgb(184, 216, 189));
const NARRATION_STYLE: Style = Style {
    color: Color::Default,
    italic: true,
    bold: false,
    block: false,
};

const PHRASE: &str = "новый год";
const FLASH_TTL: Duration = Duration::from_secs(4);
const EPILOGUE_HINT_VISIBLE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScenarioOutcome {
    /// The card played through to the end of the epilogue
    Completed,
    /// The identity check refused the visitor
    LockedOut,
}

/// The `celebrate()` listing typed during compilation
pub fn celebrate_listing(name: &str) -> Vec<String> {
    [
        "function celebrate() {",
        "  // Generating personalized message...",
        "",
        "  ",
        "  return {",
        "    message: \"🎉 Поздравляю с Новым Годом!\",",
        "    wishes: [",
        "      \"✓ Успеха во всех начинаниях\",",
        "      \"✓ Вдохновения каждый день\",",
        "      \"✓ Интересных проектов\",",
        "      \"✓ Отличного настроения\",",
        "      \"✓ И кофе всегда горячего! ☕\"",
        "    ],",
        "    success: true,",
        "    note: \"Сделано с ❤️\"",
        "  }",
        "}",
    ]
    .iter()
    .map(|line| match *line {
        "" => format!("  const recipient = \"{name}\";"),
        other => other.to_string(),
    })
    .collect()
}

/// Script-level helpers over a terminal, paced by the card configuration
struct Narrator<'a> {
    terminal: &'a Terminal,
    config: &'a CardConfig,
}

impl Narrator<'_> {
    fn typing_delay(&self) -> Duration {
        self.config.pace.scale(DEFAULT_TYPING_DELAY)
    }

    async fn pause(&self, ms: u64) {
        self.config.pace.wait(ms).await;
    }

    async fn say(&self, text: &str) -> Result<LineId> {
        Ok(self
            .terminal
            .type_text(text, Style::default(), self.typing_delay())
            .await?)
    }

    async fn narrate(&self, text: &str) -> Result<LineId> {
        Ok(self
            .terminal
            .type_text(text, NARRATION_STYLE, self.typing_delay())
            .await?)
    }

    async fn narrate_slowly(&self, text: &str, delay_ms: u64) -> Result<LineId> {
        let delay = self.config.pace.millis(delay_ms);
        Ok(self.terminal.type_text(text, NARRATION_STYLE, delay).await?)
    }

    /// Narrate each line, pausing and breaking after it
    async fn stanza(&self, lines: &[&str]) -> Result<()> {
        for line in lines {
            self.narrate(line).await?;
            self.pause(500).await;
            self.newline().await;
        }
        Ok(())
    }

    async fn newline(&self) -> LineId {
        self.terminal.write_line("").await
    }

    async fn paragraph_break(&self) {
        self.terminal.write_line("\u{a0}").await;
        self.terminal.write_line("").await;
    }

    async fn prompt(&self) {
        self.terminal.write_line("\u{a0}").await;
        self.terminal.write_line(PROMPT).await;
    }

    /// Write a blank cell and start a spinner on it
    async fn spinner(&self) -> Result<Spinner> {
        let cell = self.terminal.write(" ", Style::default()).await;
        let interval = self.config.pace.scale(DEFAULT_SPINNER_INTERVAL);
        Ok(self.terminal.start_spinner(cell, 0, interval).await?)
    }

    /// Wait for a matching command with an idle hint armed meanwhile
    async fn gate(&self, hint: &str, matcher: &Matcher, on_mismatch: OnMismatch) -> Result<String> {
        self.terminal
            .arm_idle_hint(hint, self.config.hint_delay, None)
            .await;
        let accepted = self.terminal.wait_for_command(matcher, on_mismatch).await;
        self.terminal.hide_hint().await;
        self.terminal.disarm_hint();
        Ok(accepted?)
    }

    /// Ask for a name until a permitted one is given, or until the first
    /// refusal under the lock-out policy
    async fn identify(&self) -> Result<Option<String>> {
        let matcher = Matcher::one_of(PERMITTED_NAMES);
        let on_mismatch = match self.config.identity {
            IdentityPolicy::Retry => OnMismatch::Deny {
                notice: ACCESS_DENIED,
                ttl: FLASH_TTL,
            },
            IdentityPolicy::LockOut => OnMismatch::Reject,
        };

        match self.terminal.wait_for_command(&matcher, on_mismatch).await {
            Ok(name) => Ok(Some(name)),
            Err(TerminalError::CommandRejected(input)) => {
                warn!("name not permitted: {:?}", input);
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Play the card on `terminal`
pub async fn run<E>(
    terminal: &Terminal,
    effects: &E,
    config: &CardConfig,
) -> Result<ScenarioOutcome>
where
    E: Effects + ?Sized,
{
    let n = Narrator { terminal, config };
    let phrase = Matcher::phrase(PHRASE)?;

    n.pause(2000).await;
    tokio::join!(effects.hide_loader(), terminal.show());

    n.say("> Инициализация happy-new-year-card.sh ").await?;
    let init_spinner = n.spinner().await?;
    n.newline().await;

    let identity_label = n.say("> Идентификация личности ").await?;
    let identity_spinner = n.spinner().await?;
    let identity_break = n.newline().await;
    let prompt = n.say("🟩 Представьтесь: ").await?;

    let Some(name) = n.identify().await? else {
        identity_spinner.dispose(' ').await?;
        init_spinner.dispose(' ').await?;
        terminal.replace_char_in(prompt, 0, '⛔').await?;
        info!("identity check failed, card locked");
        return Ok(ScenarioOutcome::LockedOut);
    };
    info!("identity confirmed: {}", name);

    let identity_cell = identity_spinner.line();
    identity_spinner.dispose(' ').await?;
    terminal.replace_char_in(prompt, 0, '✅').await?;
    n.pause(500).await;
    for line in [prompt, identity_break, identity_cell, identity_label] {
        terminal.delete_line(line).await?;
    }

    n.say("> Личность подтверждена").await?;
    n.pause(500).await;
    n.say(&format!(", привет, {name} ⭐")).await?;
    n.newline().await;
    n.pause(500).await;

    n.say("> Компиляция поздравления ").await?;
    let compile_spinner = n.spinner().await?;
    n.paragraph_break().await;

    let listing = celebrate_listing(&name);
    for (i, line) in listing.iter().enumerate() {
        terminal.type_text(line, CODE_STYLE, n.typing_delay()).await?;
        if i + 1 < listing.len() {
            n.newline().await;
        }
    }
    n.paragraph_break().await;
    n.pause(500).await;

    n.say("> celebrate()").await?;
    n.newline().await;
    n.pause(500).await;
    n.say("✨ Success! Status Code: 200 OK ✨").await?;
    init_spinner.dispose('✅').await?;
    compile_spinner.dispose('✅').await?;
    n.paragraph_break().await;

    // snow
    n.narrate("Но, это ещё не всё.").await?;
    n.pause(500).await;
    n.newline().await;
    n.narrate("Какой Новый Год без снега?").await?;
    n.newline().await;
    n.pause(500).await;
    n.narrate("Пора ввести команду `snow`").await?;
    n.prompt().await;
    n.pause(500).await;
    n.gate("Введи snow", &Matcher::exact("snow"), OnMismatch::CommandNotFound)
        .await?;
    n.pause(500).await;

    terminal.reset().await;
    terminal.write("$ snow", Style::default()).await;
    n.newline().await;
    n.say("> Инициализация снега ").await?;
    let snow_spinner = n.spinner().await?;
    n.newline().await;
    n.pause(1000).await;
    effects.start_snow().await;
    n.pause(500).await;
    snow_spinner.dispose('✅').await?;
    n.pause(500).await;
    n.say("> Снегопад инициализирован! ❄️").await?;
    n.paragraph_break().await;
    n.pause(1000).await;

    for flake in ["Одна снежинка.", "Вторая.", "Третья."] {
        n.narrate_slowly(flake, 90).await?;
        n.newline().await;
        n.pause(500).await;
    }
    n.narrate_slowly("Праздник приходит по частям.", 80).await?;
    n.pause(1000).await;
    n.paragraph_break().await;

    // music
    n.narrate("Снег задал ритм. Но для полного волшебства не хватает мелодии.")
        .await?;
    n.newline().await;
    n.pause(500).await;
    n.narrate("Найди команду, которая превратит тишину в music.").await?;
    n.prompt().await;
    n.pause(500).await;
    n.gate("Введи music", &Matcher::exact("music"), OnMismatch::CommandNotFound)
        .await?;
    n.pause(500).await;

    terminal.reset().await;
    terminal.write("$ music", Style::default()).await;
    n.newline().await;
    n.say("> Запуск музыки ").await?;
    let music_spinner = n.spinner().await?;
    n.pause(500).await;
    effects.play_music().await;
    n.pause(2000).await;
    music_spinner.dispose('✅').await?;
    n.pause(500).await;
    n.paragraph_break().await;

    n.stanza(&["Снег уже идёт.", "Музыка звучит."]).await?;
    n.narrate("Окружение готово.").await?;
    n.pause(500).await;
    n.paragraph_break().await;

    n.stanza(&["Но праздник не любит случайностей.", "Он хочет убедиться,"])
        .await?;
    n.narrate("что ты понимаешь,").await?;
    n.pause(500).await;
    n.narrate(" что именно происходит.").await?;
    n.pause(1000).await;
    n.paragraph_break().await;

    // three phrase gates
    let verses: [(&[&str], &str, &str, &str); 3] = [
        (
            &["Снег кружится у ворот —"],
            "К нам приходит ",
            "Правильный ответ \"Новый год\"",
            "Верно!",
        ),
        (
            &["Он приходит в зимний вечер,", "Зажигать на ёлке свечи.", "Он заводит хоровод –"],
            "Это праздник ",
            "Снова \"Новый год\"",
            "Да, это он!",
        ),
        (
            &["Старый тихо ускользнёт,", "Час двенадцать раз пробьёт.", "Каждый чуда очень ждёт —"],
            "Наступает ",
            "И ещё раз \"Новый год\"",
            "И снова в точку!",
        ),
    ];
    for (i, (lines, lead, hint, praise)) in verses.iter().enumerate() {
        if i > 0 {
            n.paragraph_break().await;
        }
        n.stanza(lines).await?;
        n.narrate(lead).await?;
        n.gate(hint, &phrase, OnMismatch::EraseInPlace).await?;
        n.paragraph_break().await;
        n.narrate(praise).await?;
        n.pause(1000).await;
    }

    // epilogue
    terminal.hide().await;
    terminal
        .arm_idle_hint(EPILOGUE_HINT, config.hint_delay, Some(EPILOGUE_HINT_VISIBLE))
        .await;
    effects.run_epilogue().await?;
    terminal.disarm_hint();
    terminal.hide_hint().await;

    info!("card finished");
    Ok(ScenarioOutcome::Completed)
}
