//! Rolling statistics over a meeting's score history
//!
//! Input is newest-first, as returned by transcript retrieval. Entries
//! without a score are skipped by every projection. All functions here are
//! pure.

use callscore_common::db::{Score, TranscriptWithScore};
use serde::Serialize;

/// Scored entries averaged into `avgLastK`
pub const AVERAGE_WINDOW: usize = 3;

/// Scored entries projected into the trend series
pub const TREND_WINDOW: usize = 12;

/// Scored entries projected into the bar series
pub const BAR_WINDOW: usize = 5;

/// Component-wise rounded mean of recent scores
///
/// A metric is `None` when any averaged score lacks it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreAverages {
    pub pitch_score: Option<f64>,
    pub conversion_score: Option<f64>,
    pub rapport_score: Option<f64>,
    pub objection_score: Option<f64>,
    pub closing_score: Option<f64>,
    pub overall: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarPoint {
    pub metric: &'static str,
    pub current: Option<f64>,
    pub average: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub name: String,
    pub score: Option<f64>,
}

/// One bar group; field names are the chart's series labels
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct BarEntry {
    #[serde(rename = "name")]
    pub name: String,
    pub pitch: Option<f64>,
    pub conversion: Option<f64>,
    pub rapport: Option<f64>,
    pub objection: Option<f64>,
    pub closing: Option<f64>,
}

/// Dashboard read-model for one meeting
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedAnalytics {
    pub latest: Option<TranscriptWithScore>,
    pub avg_last_k: Option<ScoreAverages>,
    pub radar_series: Vec<RadarPoint>,
    pub trend_series: Vec<TrendPoint>,
    pub bar_series: Vec<BarEntry>,
}

/// JavaScript-style `Math.round`: halves round toward positive infinity
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Compute every projection for a newest-first history
pub fn aggregate(items: &[TranscriptWithScore]) -> AggregatedAnalytics {
    let latest = items.iter().find(|item| item.score.is_some()).cloned();
    let avg_last_k = average_last_k(items, AVERAGE_WINDOW);

    let radar_series = match (latest.as_ref().and_then(|l| l.score.as_ref()), &avg_last_k) {
        (Some(current), Some(average)) => radar(current, average),
        _ => Vec::new(),
    };

    AggregatedAnalytics {
        latest,
        avg_last_k,
        radar_series,
        trend_series: trend(items, TREND_WINDOW),
        bar_series: bars(items, BAR_WINDOW),
    }
}

fn scored(items: &[TranscriptWithScore]) -> impl Iterator<Item = &Score> + '_ {
    items.iter().filter_map(|item| item.score.as_ref())
}

/// Mean of up to `k` most recent scores, `None` when nothing is scored
pub fn average_last_k(items: &[TranscriptWithScore], k: usize) -> Option<ScoreAverages> {
    let window: Vec<&Score> = scored(items).take(k).collect();
    if window.is_empty() {
        return None;
    }

    let mean = |field: fn(&Score) -> Option<f64>| -> Option<f64> {
        let total = window
            .iter()
            .map(|s| field(s))
            .sum::<Option<f64>>()?;
        Some(round_half_up(total / window.len() as f64))
    };

    Some(ScoreAverages {
        pitch_score: mean(|s| s.pitch_score),
        conversion_score: mean(|s| s.conversion_score),
        rapport_score: mean(|s| s.rapport_score),
        objection_score: mean(|s| s.objection_score),
        closing_score: mean(|s| s.closing_score),
        overall: mean(|s| s.overall),
    })
}

fn radar(current: &Score, average: &ScoreAverages) -> Vec<RadarPoint> {
    let point = |metric, current, average| RadarPoint {
        metric,
        current,
        average,
    };

    vec![
        point("Pitch", current.pitch_score, average.pitch_score),
        point("Conversion", current.conversion_score, average.conversion_score),
        point("Rapport", current.rapport_score, average.rapport_score),
        point("Objection", current.objection_score, average.objection_score),
        point("Closing", current.closing_score, average.closing_score),
    ]
}

/// Overall scores of the `k` most recent entries, oldest first, labelled M1..Mk
fn trend(items: &[TranscriptWithScore], k: usize) -> Vec<TrendPoint> {
    let mut window: Vec<&Score> = scored(items).take(k).collect();
    window.reverse();

    window
        .into_iter()
        .enumerate()
        .map(|(idx, score)| TrendPoint {
            name: format!("M{}", idx + 1),
            score: score.overall,
        })
        .collect()
}

/// Sub-scores of the `k` most recent entries, oldest first
///
/// Labels count down from the full history length (`#N`, `#N-1`, ...),
/// including unscored entries, so they are positional rather than
/// per-transcript.
fn bars(items: &[TranscriptWithScore], k: usize) -> Vec<BarEntry> {
    let mut window: Vec<&Score> = scored(items).take(k).collect();
    window.reverse();

    window
        .into_iter()
        .enumerate()
        .map(|(i, score)| BarEntry {
            name: format!("#{}", items.len() as i64 - i as i64),
            pitch: score.pitch_score,
            conversion: score.conversion_score,
            rapport: score.rapport_score,
            objection: score.objection_score,
            closing: score.closing_score,
        })
        .collect()
}
