//! Multi-entity orchestration: per-content series, population and community views.

use std::collections::BTreeMap;

use rc_common::{ContentId, Error, Event, Result};
use rc_config::{resolve, Granularity, RecurrenceConfig};
use serde::Serialize;

use crate::burst::{BurstStateSolver, Metric};
use crate::logging::{event_names, Stage};
use crate::series::{BurstSummary, ContentSeries};

/// Community key → content ids it contains.
pub type CommunityMap = BTreeMap<String, Vec<ContentId>>;

/// Aggregation scale for a metric query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scale {
    /// Map from content id to value.
    Node,
    /// Table of `(content id, value)` rows.
    Population,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationRow {
    pub content_id: ContentId,
    pub value: Option<f64>,
}

/// One metric across a set of entities.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopulationTable {
    pub metric: Metric,
    pub rows: Vec<PopulationRow>,
}

impl PopulationTable {
    pub fn get(&self, id: &ContentId) -> Option<&PopulationRow> {
        self.rows.iter().find(|r| &r.content_id == id)
    }

    /// Values that are not "no value".
    pub fn defined_values(&self) -> Vec<f64> {
        self.rows.iter().filter_map(|r| r.value).collect()
    }

    pub fn content_ids(&self) -> impl Iterator<Item = &ContentId> {
        self.rows.iter().map(|r| &r.content_id)
    }
}

/// Result of a [`RecurrenceAnalyzer::measure`] query.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ScaleResult {
    Node(BTreeMap<ContentId, Option<f64>>),
    Population(PopulationTable),
}

/// Population tables per community.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityTables {
    pub metric: Metric,
    pub communities: BTreeMap<String, PopulationTable>,
}

impl CommunityTables {
    /// Content ids across every selected community, repeats included.
    pub fn content_ids(&self) -> impl Iterator<Item = &ContentId> {
        self.communities.values().flat_map(PopulationTable::content_ids)
    }
}

/// Runs the burst pipeline once per content id and serves aggregated views.
#[derive(Debug)]
pub struct RecurrenceAnalyzer {
    series: BTreeMap<ContentId, ContentSeries>,
    communities: Option<CommunityMap>,
    default_content: Option<Vec<ContentId>>,
    default_communities: Option<Vec<String>>,
}

impl RecurrenceAnalyzer {
    /// Split `events` by content id and analyze each entity.
    pub fn new(events: Vec<Event>, granularity: Granularity, solver: &BurstStateSolver) -> Self {
        let mut by_content: BTreeMap<ContentId, Vec<Event>> = BTreeMap::new();
        for event in events {
            by_content
                .entry(event.content_id.clone())
                .or_default()
                .push(event);
        }

        let series: BTreeMap<ContentId, ContentSeries> = by_content
            .into_iter()
            .map(|(id, events)| {
                let series = ContentSeries::new(id.clone(), events, granularity, solver);
                (id, series)
            })
            .collect();

        tracing::info!(
            stage = %Stage::Detect,
            entities = series.len(),
            detected = series.values().filter(|s| s.detection().is_detected()).count(),
            "analyzed content entities"
        );

        RecurrenceAnalyzer {
            series,
            communities: None,
            default_content: None,
            default_communities: None,
        }
    }

    /// Build from a validated config, applying its selections as defaults.
    pub fn from_config(events: Vec<Event>, config: &RecurrenceConfig) -> Result<Self> {
        let solver = BurstStateSolver::new(config.solver)?;
        let mut analyzer = Self::new(events, config.granularity, &solver);
        if let Some(ids) = &config.selected_content {
            analyzer = analyzer.with_default_content(ids.iter().map(ContentId::new).collect());
        }
        if let Some(keys) = &config.selected_communities {
            analyzer = analyzer.with_default_communities(keys.clone());
        }
        Ok(analyzer)
    }

    pub fn with_communities(mut self, communities: CommunityMap) -> Self {
        self.communities = Some(communities);
        self
    }

    /// Content ids used when a query passes no explicit selection.
    pub fn with_default_content(mut self, ids: Vec<ContentId>) -> Self {
        self.default_content = Some(ids);
        self
    }

    /// Communities used when a query passes no explicit selection.
    pub fn with_default_communities(mut self, keys: Vec<String>) -> Self {
        self.default_communities = Some(keys);
        self
    }

    pub fn content_ids(&self) -> impl Iterator<Item = &ContentId> {
        self.series.keys()
    }

    pub fn series(&self, id: &ContentId) -> Option<&ContentSeries> {
        self.series.get(id)
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn communities(&self) -> Option<&CommunityMap> {
        self.communities.as_ref()
    }

    /// One statistic of one entity.
    pub fn content_metric(&self, id: &ContentId, metric: Metric) -> Result<Option<f64>> {
        self.series
            .get(id)
            .map(|s| s.metric(metric))
            .ok_or_else(|| Error::UnknownContent(id.to_string()))
    }

    /// Like [`content_metric`](Self::content_metric) with the metric given by name.
    pub fn metric_by_name(&self, id: &ContentId, name: &str) -> Result<Option<f64>> {
        let metric: Metric = name.parse()?;
        self.content_metric(id, metric)
    }

    /// Known series for a content selection, falling back to the instance
    /// default and then to every entity. Unknown ids are skipped.
    fn select_series(&self, explicit: Option<&[ContentId]>) -> Vec<&ContentSeries> {
        let ids = resolve(
            explicit.map(<[ContentId]>::to_vec),
            self.default_content.clone(),
            || self.series.keys().cloned().collect(),
        );
        ids.iter()
            .filter_map(|id| {
                let found = self.series.get(id);
                if found.is_none() {
                    tracing::warn!(
                        event = event_names::SELECTION_UNKNOWN_ID,
                        stage = %Stage::Measure,
                        content_id = %id,
                        "selected content id not present in the data"
                    );
                }
                found
            })
            .collect()
    }

    pub fn node_level(
        &self,
        metric: Metric,
        selection: Option<&[ContentId]>,
    ) -> BTreeMap<ContentId, Option<f64>> {
        self.select_series(selection)
            .into_iter()
            .map(|s| (s.content_id().clone(), s.metric(metric)))
            .collect()
    }

    /// Rows follow the selection order; without a selection, content id order.
    pub fn population(&self, metric: Metric, selection: Option<&[ContentId]>) -> PopulationTable {
        let rows = self
            .select_series(selection)
            .into_iter()
            .map(|s| PopulationRow {
                content_id: s.content_id().clone(),
                value: s.metric(metric),
            })
            .collect();
        PopulationTable { metric, rows }
    }

    pub fn measure(
        &self,
        scale: Scale,
        metric: Metric,
        selection: Option<&[ContentId]>,
    ) -> ScaleResult {
        match scale {
            Scale::Node => ScaleResult::Node(self.node_level(metric, selection)),
            Scale::Population => ScaleResult::Population(self.population(metric, selection)),
        }
    }

    /// Population tables grouped by community.
    ///
    /// Fails with [`Error::MissingCommunityMapping`] when no mapping was
    /// supplied. Unknown community keys are skipped.
    pub fn community_level(
        &self,
        metric: Metric,
        selection: Option<&[String]>,
    ) -> Result<CommunityTables> {
        let Some(mapping) = &self.communities else {
            tracing::warn!(
                event = event_names::COMMUNITY_MAPPING_MISSING,
                stage = %Stage::Measure,
                metric = %metric,
                "community view requested without a community mapping"
            );
            return Err(Error::MissingCommunityMapping);
        };

        let keys = resolve(
            selection.map(<[String]>::to_vec),
            self.default_communities.clone(),
            || mapping.keys().cloned().collect(),
        );

        let mut communities = BTreeMap::new();
        for key in keys {
            match mapping.get(&key) {
                Some(members) => {
                    let table = self.population(metric, Some(members.as_slice()));
                    communities.insert(key, table);
                }
                None => tracing::warn!(
                    event = event_names::SELECTION_UNKNOWN_ID,
                    stage = %Stage::Measure,
                    community = %key,
                    "selected community not present in the mapping"
                ),
            }
        }
        Ok(CommunityTables {
            metric,
            communities,
        })
    }

    /// Per-entity summaries for a selection.
    pub fn summaries(&self, selection: Option<&[ContentId]>) -> Vec<BurstSummary> {
        self.select_series(selection)
            .into_iter()
            .map(ContentSeries::summary)
            .collect()
    }

    /// True when at least one of `ids` has a burst. Unknown ids count as
    /// burst-free.
    pub fn any_bursts<'a>(&self, ids: impl IntoIterator<Item = &'a ContentId>) -> bool {
        ids.into_iter()
            .filter_map(|id| self.series.get(id))
            .any(|s| !s.intervals().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn day(d: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap() + Duration::days(d)
    }

    fn daily(content: &str, counts: &[i64]) -> Vec<Event> {
        let mut out = Vec::new();
        for (d, &n) in counts.iter().enumerate() {
            for k in 0..n {
                out.push(Event::new(
                    format!("{content}-{d}-{k}"),
                    day(d as i64) + Duration::minutes(k),
                    format!("u{k}"),
                    "twitter",
                    content,
                ));
            }
        }
        out
    }

    fn analyzer() -> RecurrenceAnalyzer {
        let mut events = daily("X", &[1, 1, 1, 20, 22, 19, 1, 1, 1]);
        events.extend(daily("Y", &[2, 2, 2, 2, 2, 2]));
        events.extend(daily("Z", &[1]));
        RecurrenceAnalyzer::new(events, Granularity::daily(), &BurstStateSolver::default())
    }

    fn ids(names: &[&str]) -> Vec<ContentId> {
        names.iter().map(|n| ContentId::new(*n)).collect()
    }

    #[test]
    fn analyzer_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RecurrenceAnalyzer>();
    }

    #[test]
    fn splits_by_content() {
        let a = analyzer();
        assert_eq!(a.len(), 3);
        assert_eq!(a.content_metric(&ContentId::new("X"), Metric::BurstCount).unwrap(), Some(1.0));
        assert_eq!(a.content_metric(&ContentId::new("Y"), Metric::BurstCount).unwrap(), Some(0.0));
        assert_eq!(a.content_metric(&ContentId::new("Z"), Metric::BurstCount).unwrap(), None);
        assert!(a.any_bursts(a.content_ids()));
        assert!(!a.any_bursts(&ids(&["Y", "Z", "missing"])));
    }

    #[test]
    fn unknown_content_and_metric() {
        let a = analyzer();
        let err = a.content_metric(&ContentId::new("nope"), Metric::BurstCount).unwrap_err();
        assert_eq!(err.code(), 33);
        let err = a.metric_by_name(&ContentId::new("X"), "virality").unwrap_err();
        assert_eq!(err.code(), 31);
        assert_eq!(a.metric_by_name(&ContentId::new("X"), "number_of_bursts").unwrap(), Some(1.0));
    }

    #[test]
    fn population_keeps_insufficient_rows() {
        let table = analyzer().population(Metric::MeanBurstSize, None);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.get(&ContentId::new("Z")).unwrap().value, None);
        assert_eq!(table.get(&ContentId::new("X")).unwrap().value, Some(61.0));
    }

    #[test]
    fn selection_falls_back_to_instance_default() {
        let a = analyzer().with_default_content(ids(&["Y"]));
        assert_eq!(a.population(Metric::BurstCount, None).rows.len(), 1);
        let explicit = ids(&["X", "Z", "missing"]);
        let table = a.population(Metric::BurstCount, Some(explicit.as_slice()));
        let got: Vec<&str> = table.rows.iter().map(|r| r.content_id.as_str()).collect();
        assert_eq!(got, vec!["X", "Z"]);
    }

    #[test]
    fn node_level_maps_ids() {
        let a = analyzer();
        match a.measure(Scale::Node, Metric::BurstCount, None) {
            ScaleResult::Node(map) => {
                assert_eq!(map.len(), 3);
                assert_eq!(map[&ContentId::new("X")], Some(1.0));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn community_view_requires_mapping() {
        let err = analyzer().community_level(Metric::BurstCount, None).unwrap_err();
        assert!(matches!(err, Error::MissingCommunityMapping));
    }

    #[test]
    fn community_view_groups_population_rows() {
        let mut mapping = CommunityMap::new();
        mapping.insert("C1".into(), ids(&["X", "Y"]));
        mapping.insert("C2".into(), ids(&["Z"]));
        let a = analyzer().with_communities(mapping);

        let population = a.population(Metric::BurstCount, None);
        let tables = a.community_level(Metric::BurstCount, None).unwrap();
        let c1 = &tables.communities["C1"];
        assert_eq!(c1.rows.len(), 2);
        for row in &c1.rows {
            assert_eq!(Some(row), population.get(&row.content_id));
        }

        assert!(a.any_bursts(tables.content_ids()));

        let only = vec!["C2".to_string(), "C9".to_string()];
        let tables = a.community_level(Metric::BurstCount, Some(only.as_slice())).unwrap();
        assert_eq!(tables.communities.keys().collect::<Vec<_>>(), vec!["C2"]);
        assert!(!a.any_bursts(tables.content_ids()));
    }

    #[test]
    fn burst_outcome_follows_population_selection() {
        let a = analyzer();
        let flat = ids(&["Y"]);
        let table = a.population(Metric::BurstCount, Some(flat.as_slice()));
        assert!(!a.any_bursts(table.content_ids()));
        let table = a.population(Metric::BurstCount, None);
        assert!(a.any_bursts(table.content_ids()));
    }
}
