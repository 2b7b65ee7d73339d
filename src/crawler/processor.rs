//! Match processor - turns one listing row into queued table rows
//!
//! For each row this module:
//! - Parses the score text (sentinels included)
//! - Resolves both clubs; a missing club skips the whole match
//! - Fetches the match page for the venue, officials, rosters and coaches
//! - Feeds every player's annotation block to the event parser

use crate::crawler::Fetcher;
use crate::events::parse_annotations;
use crate::extract::{parse_match_page, ListingRow, MatchPage, RosterSection};
use crate::model::{
    CoachAssignment, Id, Match, MatchEvent, Participation, RefereeAssignment, Score,
};
use crate::resolve::Resolver;

/// Why a listing row produced no match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Score text matched no known grammar
    AmbiguousScore(String),
    /// A club link was missing or could not be resolved
    UnresolvedClub(String),
}

/// Result of processing one listing row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    Recorded { match_id: Id, events: usize },
    Skipped(SkipReason),
}

/// Processes listing rows for one competition edition
#[derive(Debug, Clone, Copy)]
pub struct MatchProcessor {
    edition_id: Id,
}

impl MatchProcessor {
    pub fn new(edition_id: Id) -> Self {
        Self { edition_id }
    }

    /// Processes one listing row
    ///
    /// Every row produced is queued on the resolver; nothing is written
    /// here. Failures below the club level only leave references empty.
    pub async fn process(
        &self,
        row: &ListingRow,
        fetcher: &mut Fetcher,
        resolver: &mut Resolver,
    ) -> MatchOutcome {
        let score = match Score::parse(&row.score_text) {
            Ok(score) => score,
            Err(e) => {
                tracing::warn!("Skipping {} x {} on {}: {}", row.home.name, row.away.name, row.date, e);
                return MatchOutcome::Skipped(SkipReason::AmbiguousScore(row.score_text.clone()));
            }
        };

        let mut club_ids = [0; 2];
        for (slot, team) in club_ids.iter_mut().zip([&row.home, &row.away]) {
            let resolved = match &team.link {
                Some(link) => resolver.resolve_club(fetcher, link).await,
                None => None,
            };
            match resolved {
                Some(id) => *slot = id,
                None => {
                    tracing::warn!(
                        "Skipping {} x {} on {}: club '{}' unresolved",
                        row.home.name,
                        row.away.name,
                        row.date,
                        team.name
                    );
                    return MatchOutcome::Skipped(SkipReason::UnresolvedClub(team.name.clone()));
                }
            }
        }
        let [home_id, away_id] = club_ids;

        let match_id = resolver.resolve_match(&row.date, home_id, away_id).id();
        tracing::info!(
            "Match #{}: {} {} {} ({}, {})",
            match_id,
            row.home.name,
            row.score_text,
            row.away.name,
            row.date,
            row.phase
        );

        let page = self.match_page(row, fetcher).await;

        let stadium_id = match &page.stadium_link {
            Some(link) => resolver.resolve_stadium(fetcher, link).await,
            None => None,
        };
        let referee_id = match &page.referee_link {
            Some(link) => resolver.resolve_referee(fetcher, link).await,
            None => None,
        };
        resolver.queue(RefereeAssignment {
            match_id,
            referee_id,
        });

        let mut events = 0;
        for section in &page.sections {
            events += self
                .roster(section, match_id, club_ids, fetcher, resolver)
                .await;
        }

        for (link, club_id) in page.coach_links.iter().zip(club_ids) {
            let coach_id = match link {
                Some(link) => resolver.resolve_coach(fetcher, link).await,
                None => None,
            };
            resolver.queue(CoachAssignment {
                match_id,
                coach_id,
                club_id,
                confirmed: u8::from(coach_id.is_some()),
            });
        }

        let (home_score, away_score) = score.goals();
        let (home_penalties, away_penalties) = score.penalties();
        resolver.queue(Match {
            id: match_id,
            edition_id: self.edition_id,
            date: row.date.clone(),
            time: row.time.clone(),
            phase: row.phase.clone(),
            round: String::new(),
            stadium_id,
            home_id,
            away_id,
            home_score,
            away_score,
            score_status: score.status().to_string(),
            home_penalties,
            away_penalties,
            extra_time: u8::from(score.extra_time()),
        });

        MatchOutcome::Recorded { match_id, events }
    }

    /// Fetches and parses the match page; an empty page on any failure
    async fn match_page(&self, row: &ListingRow, fetcher: &mut Fetcher) -> MatchPage {
        let Some(link) = &row.match_link else {
            tracing::warn!("No match page link for {} x {}", row.home.name, row.away.name);
            return MatchPage::default();
        };

        let document = match fetcher.retrieve(link).await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Match page unavailable: {}", e);
                return MatchPage::default();
            }
        };

        match parse_match_page(&document.body, &document.url) {
            Ok(page) => page,
            Err(e) => {
                tracing::warn!("Match page {} has no usable report: {}", link, e);
                MatchPage::default()
            }
        }
    }

    /// Resolves one roster section and queues participations and events
    ///
    /// Returns the number of events queued.
    async fn roster(
        &self,
        section: &RosterSection,
        match_id: Id,
        club_ids: [Id; 2],
        fetcher: &mut Fetcher,
        resolver: &mut Resolver,
    ) -> usize {
        let mut events = 0;

        for (entries, club_id) in section.sides.iter().zip(club_ids) {
            for entry in entries {
                let Some(player_id) = resolver.resolve_player(fetcher, &entry.player_link).await
                else {
                    continue;
                };

                resolver.queue(Participation {
                    match_id,
                    player_id,
                    club_id,
                    starter: u8::from(section.starter),
                    position_played: String::new(),
                    shirt_number: entry.shirt_number,
                });

                for event in parse_annotations(&entry.annotations) {
                    resolver.queue(MatchEvent {
                        id: 0,
                        match_id,
                        player_id,
                        club_id,
                        event_type: event.kind,
                        goal_qualifier: event.qualifier,
                        minute: event.minute,
                    });
                    events += 1;
                }
            }
        }

        events
    }
}
