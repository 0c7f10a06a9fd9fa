//! Scrolling epilogue shown after the terminal fades out
//!
//! Rows enter at the bottom of the screen and move up one row per step.
//! Holding Space pauses the scroll; the epilogue is finished once its last
//! row has left the top of the screen.

use std::time::Duration;
use tokio::time::Instant;

/// Time between two scroll steps at normal speed
pub const EPILOGUE_STEP: Duration = Duration::from_millis(700);

/// Key repeat gap after which a held Space counts as released
pub const HOLD_GRACE: Duration = Duration::from_millis(600);

pub const EPILOGUE_ROWS: &[&str] = &[
    "И вот, последняя метка поставлена.",
    "Ты одолела ещё один виток вокруг солнца.",
    "\u{a0}",
    "\u{a0}",
    "Я — голос этого уходящего года.",
    "Я — сумма всех его дней: ярких и тусклых, лёгких и тяжёлых.",
    "Я был полем, по которому ты шла. Картой, которую ты рисовала...",
    "Домом, который ты строила и который иногда приходилось чинить после шторма.",
    "\u{a0}",
    "\u{a0}",
    "Ты несла меня в рюкзаке, как странник — свой посох и немного припасов.",
    "Иногда я был тяжёл. Иногда я давал тебе силы.",
    "\u{a0}",
    "\u{a0}",
    "Ты думала, ты исследовала меня?",
    "Это я наблюдал за тобой.",
    "Я видел, как ты спотыкалась и поднималась.",
    "Как теряла важное, но находила ещё больше.",
    "\u{a0}",
    "\u{a0}",
    "И теперь, когда цикл завершён...",
    "...я должен уйти.",
    "\u{a0}",
    "\u{a0}",
    "Но я оставляю тебе всё, что ты приобрела.",
    "В твоих руках, которые теперь умеют чуть больше.",
    "В твоей памяти, где хранятся закаты и смех этого года.",
    "В твоём сердце, которое, несмотря на всё, продолжает биться и желать нового.",
    "\u{a0}",
    "\u{a0}",
    "Ты свободна. Ты прошла.",
    "И теперь можешь войти в новый мир — в следующий год.",
    "Он бесконечен и прекрасен в своей возможности.",
    "Как чистый лист мира в творческом режиме игры.",
    "\u{a0}",
    "\u{a0}",
    "Строй. Исследуй. Живи.",
    "А я стану звёздами на небе твоего нового небосклона.",
    "И буду тихо светить тебе с благодарностью из прошлого.",
    "\u{a0}",
    "\u{a0}",
    "\u{a0}",
    "\u{a0}",
    "Прощай.",
    "И добро пожаловать.",
    "Всегда.",
    "\u{a0}",
    "\u{a0}",
    "\u{a0}",
    "\u{a0}",
    "P.S.",
    "С наступающим 2026 годом! ❄️",
    "by abstractmage",
];

#[derive(Debug, Clone)]
pub struct Epilogue {
    rows: &'static [&'static str],
    step: Duration,
    /// Scroll steps taken so far
    steps: usize,
    next_step: Instant,
    held_until: Option<Instant>,
}

impl Epilogue {
    pub fn new(rows: &'static [&'static str], step: Duration, now: Instant) -> Self {
        Self {
            rows,
            step,
            steps: 0,
            next_step: now + step,
            held_until: None,
        }
    }

    /// Register a Space press. Auto-repeat keeps the scroll paused while the
    /// key is held.
    pub fn hold(&mut self, now: Instant) {
        self.held_until = Some(now + HOLD_GRACE);
    }

    pub fn is_paused(&self, now: Instant) -> bool {
        self.held_until.is_some_and(|until| now < until)
    }

    /// Take every scroll step that is due at `now`. Time spent paused does
    /// not count towards the next step.
    pub fn advance(&mut self, now: Instant) {
        if let Some(until) = self.held_until.filter(|until| now < *until) {
            self.next_step = until + self.step;
            return;
        }
        self.held_until = None;
        while now >= self.next_step {
            self.steps += 1;
            self.next_step += self.step;
        }
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Rows on a screen `height` rows tall, as `(screen row, text)`
    pub fn visible(&self, height: u16) -> Vec<(u16, &'static str)> {
        let height = height as i64;
        self.rows
            .iter()
            .enumerate()
            .filter_map(|(i, text)| {
                let y = height - self.steps as i64 + i as i64;
                (0..height).contains(&y).then_some((y as u16, *text))
            })
            .collect()
    }

    /// Whether the last row has scrolled off the top
    pub fn is_finished(&self, height: u16) -> bool {
        self.steps >= height as usize + self.rows.len()
    }
}
