//! User intent: which application is in front and how busy the hands are.

use chrono::NaiveDateTime;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::pick;
use crate::clock::secs_since;
use crate::notification::{NotificationCandidate, NotificationKind};
use crate::storage::IntentConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppCategory {
    Editor,
    Browser,
    Media,
    FileManager,
}

const EDITOR_APPS: &[&str] = &["xcode", "code", "iterm", "terminal", "idea", "vim", "zed"];
const BROWSER_APPS: &[&str] = &["safari", "chrome", "firefox", "edge", "opera"];
const MEDIA_APPS: &[&str] = &["bilibili", "youtube", "vlc", "iina", "netflix"];
const FILE_MANAGER_APPS: &[&str] = &["finder", "explorer", "nautilus", "dolphin"];

impl AppCategory {
    /// Coarse category from an application name, matched case-insensitively
    /// on substrings. Media is checked before browser so a tab-named window
    /// such as "YouTube - Chrome" counts as media.
    pub fn from_app_name(name: &str) -> Option<Self> {
        let name = name.to_lowercase();
        let hit = |list: &[&str]| list.iter().any(|k| name.contains(k));
        if hit(MEDIA_APPS) {
            Some(AppCategory::Media)
        } else if hit(EDITOR_APPS) {
            Some(AppCategory::Editor)
        } else if hit(BROWSER_APPS) {
            Some(AppCategory::Browser)
        } else if hit(FILE_MANAGER_APPS) {
            Some(AppCategory::FileManager)
        } else {
            None
        }
    }

    fn quotes(self) -> &'static [&'static str] {
        match self {
            AppCategory::Editor => &[
                "Keep going! Take a break when the code gets tiring~",
                "The keyboard is sparking, the code gods are watching!",
                "Fixing bugs or reinventing the wheel?",
            ],
            AppCategory::Browser => &[
                "Researching again? (or slacking off?)",
                "That page looks really interesting...",
                "Don't stare too long, remember to blink!",
            ],
            AppCategory::Media => &[
                "I want to watch this too!",
                "Break time! Let me join in",
                "Your boss is watching... just kidding.",
            ],
            AppCategory::FileManager => &[
                "Looking for something? Want me to help?",
                "So many files, maybe time for a cleanup?",
            ],
        }
    }
}

const BUSY_QUOTES: &[&str] = &[
    "Your typing speed is amazing, I'm stunned!",
    "Is this the legendary touch typing? Impressive!",
];

const DAYDREAM_QUOTES: &[&str] = &[
    "You've been staring at this page for ages. Pondering life?",
    "Zoning out is a kind of meditation too...",
    "Hello? Did you log off?",
];

#[derive(Debug, Clone)]
pub struct IntentEvaluator {
    config: IntentConfig,
    last_app: Option<String>,
    last_raised_at: Option<NaiveDateTime>,
    zero_input_since: Option<NaiveDateTime>,
}

impl IntentEvaluator {
    pub fn new(config: IntentConfig) -> Self {
        Self {
            config,
            last_app: None,
            last_raised_at: None,
            zero_input_since: None,
        }
    }

    pub fn last_raised_at(&self) -> Option<NaiveDateTime> {
        self.last_raised_at
    }

    /// Restart an ongoing quiet stretch at `now`, so a stretch that spanned
    /// a suspension only counts the time since resuming.
    pub fn restart_quiet_stretch(&mut self, now: NaiveDateTime) {
        if self.zero_input_since.is_some() {
            self.zero_input_since = Some(now);
        }
    }

    pub fn evaluate<R: Rng + ?Sized>(
        &mut self,
        active_app: Option<String>,
        input_frequency: Option<u32>,
        now: NaiveDateTime,
        rng: &mut R,
    ) -> Option<NotificationCandidate> {
        // The quiet stretch is measured even while the gap below holds.
        match input_frequency {
            Some(0) => {
                self.zero_input_since.get_or_insert(now);
            }
            Some(_) => self.zero_input_since = None,
            None => {}
        }

        if secs_since(self.last_raised_at, now) <= self.config.min_gap_secs {
            return None;
        }

        if let Some(app) = active_app {
            if self.last_app.as_deref() != Some(app.as_str()) {
                let category = AppCategory::from_app_name(&app);
                self.last_app = Some(app);
                if let Some(category) = category {
                    return Some(self.raise(pick(category.quotes(), rng), now));
                }
            }
        }

        let frequency = input_frequency?;
        if frequency > self.config.high_activity_threshold {
            return Some(self.raise(pick(BUSY_QUOTES, rng), now));
        }
        if frequency == 0
            && secs_since(self.zero_input_since, now) > self.config.zero_input_secs
        {
            self.zero_input_since = Some(now);
            return Some(self.raise(pick(DAYDREAM_QUOTES, rng), now));
        }
        None
    }

    fn raise(&mut self, text: String, now: NaiveDateTime) -> NotificationCandidate {
        self.last_raised_at = Some(now);
        NotificationCandidate::normal(text, NotificationKind::Interaction)
    }
}
