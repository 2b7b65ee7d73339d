use crate::ParseAmbiguity;
use regex::Regex;
use std::sync::OnceLock;

/// Outcome text of a listing row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Score {
    Played {
        home: u32,
        away: u32,
        /// Shoot-out result, when the tie went to penalties
        penalties: Option<(u32, u32)>,
        extra_time: bool,
    },
    Walkover,
    Annulled,
    Incomplete,
}

fn goals_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"(\d+)\s*-\s*(\d+)").expect("score pattern is valid"))
}

fn penalties_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)\((\d+)\s*-\s*(\d+)\s*pen").expect("penalty pattern is valid")
    })
}

impl Score {
    /// Parses listing score text
    ///
    /// Sentinels are checked first, so `"WO"` never reaches the numeric
    /// grammar. Text matching neither is a [`ParseAmbiguity`].
    ///
    /// # Examples
    ///
    /// ```
    /// use match_ledger::model::Score;
    ///
    /// assert_eq!(Score::parse("WO").unwrap(), Score::Walkover);
    /// assert!(matches!(Score::parse("2-1").unwrap(), Score::Played { home: 2, away: 1, .. }));
    /// ```
    pub fn parse(text: &str) -> Result<Self, ParseAmbiguity> {
        let trimmed = text.trim();
        let upper = trimmed.to_uppercase();

        if upper.contains("WO") {
            return Ok(Self::Walkover);
        }
        if upper.contains("ANU") {
            return Ok(Self::Annulled);
        }
        if upper.contains("IC") {
            return Ok(Self::Incomplete);
        }

        let ambiguous = || ParseAmbiguity::Score(trimmed.to_string());

        let caps = goals_pattern().captures(trimmed).ok_or_else(ambiguous)?;
        let home = caps[1].parse().map_err(|_| ambiguous())?;
        let away = caps[2].parse().map_err(|_| ambiguous())?;

        let penalties = penalties_pattern()
            .captures(trimmed)
            .and_then(|p| Some((p[1].parse().ok()?, p[2].parse().ok()?)));

        Ok(Self::Played {
            home,
            away,
            penalties,
            extra_time: trimmed.to_lowercase().contains("pro."),
        })
    }

    /// Sentinel label persisted in `placar_status`; empty for a played match
    pub fn status(&self) -> &'static str {
        match self {
            Self::Played { .. } => "",
            Self::Walkover => "WO",
            Self::Annulled => "ANU",
            Self::Incomplete => "IC",
        }
    }

    pub fn goals(&self) -> (Option<u32>, Option<u32>) {
        match self {
            Self::Played { home, away, .. } => (Some(*home), Some(*away)),
            _ => (None, None),
        }
    }

    pub fn penalties(&self) -> (Option<u32>, Option<u32>) {
        match self {
            Self::Played {
                penalties: Some((home, away)),
                ..
            } => (Some(*home), Some(*away)),
            _ => (None, None),
        }
    }

    pub fn extra_time(&self) -> bool {
        matches!(self, Self::Played { extra_time: true, .. })
    }
}
