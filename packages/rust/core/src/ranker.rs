//! Filtering, ranking and output shaping of discovered institutions.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, info, instrument};

use unifind_shared::{
    DistanceElement, InstitutionAddress, InstitutionCandidate, RankedInstitution,
    StructuredAddress,
};

/// A candidate paired with its driving distance (0 when unknown).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCandidate {
    pub candidate: InstitutionCandidate,
    pub distance_m: u64,
}

/// Result of [`rank_and_select`].
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// The ladder step that let candidates through, if any did.
    pub review_threshold: Option<u32>,
    pub institutions: Vec<RankedInstitution>,
}

/// Pair candidate `i` with element `i`. A missing, non-OK or distance-less
/// element counts as 0 meters.
pub fn attach_distances(
    candidates: Vec<InstitutionCandidate>,
    elements: &[DistanceElement],
) -> Vec<ScoredCandidate> {
    candidates
        .into_iter()
        .enumerate()
        .map(|(i, candidate)| ScoredCandidate {
            distance_m: elements.get(i).and_then(DistanceElement::meters).unwrap_or(0),
            candidate,
        })
        .collect()
}

/// School-typed places that are not also a university or college.
pub fn is_likely_secondary_school(candidate: &InstitutionCandidate) -> bool {
    static HIGHER_ED_NAME_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"(?i)university|college").expect("valid regex"));

    let school = candidate.has_type("school") || candidate.has_type("secondary_school");
    let higher_ed = candidate.has_type("university")
        || candidate.has_type("college")
        || HIGHER_ED_NAME_RE.is_match(&candidate.name);

    school && !higher_ed
}

/// Candidates with at least `min_reviews` ratings, input order kept.
pub fn survivors(candidates: &[ScoredCandidate], min_reviews: u32) -> Vec<&ScoredCandidate> {
    candidates
        .iter()
        .filter(|s| s.candidate.user_ratings_total.unwrap_or(0) >= min_reviews)
        .collect()
}

/// `rating × user_ratings_total`, missing values counting as 0.
pub fn popularity_score(candidate: &InstitutionCandidate) -> f64 {
    candidate.rating.unwrap_or(0.0) * f64::from(candidate.user_ratings_total.unwrap_or(0))
}

/// Whole driving minutes for a distance, rounded up.
pub fn avg_time_by_car(distance_m: u64, minutes_per_km: f64) -> u32 {
    ((distance_m as f64 / 1000.0) * minutes_per_km).ceil() as u32
}

/// Drop likely schools, gate on review count (relaxing down the ladder until
/// something survives), sort by popularity and shape the top `limit`.
///
/// Ties keep discovery order.
#[instrument(skip_all, fields(candidates = scored.len(), limit = limit))]
pub fn rank_and_select(
    scored: Vec<ScoredCandidate>,
    review_thresholds: &[u32],
    limit: usize,
    minutes_per_km: f64,
    property: &StructuredAddress,
) -> Selection {
    let eligible: Vec<ScoredCandidate> = scored
        .into_iter()
        .filter(|s| {
            let school = is_likely_secondary_school(&s.candidate);
            if school {
                debug!(name = %s.candidate.name, "excluding likely secondary school");
            }
            !school
        })
        .collect();

    let Some((threshold, mut ranked)) = review_thresholds.iter().find_map(|&min_reviews| {
        let passed = survivors(&eligible, min_reviews);
        debug!(min_reviews, survivors = passed.len(), "review gate applied");
        (!passed.is_empty()).then_some((min_reviews, passed))
    }) else {
        info!("no institution met any review threshold");
        return Selection::default();
    };

    ranked.sort_by(|a, b| {
        popularity_score(&b.candidate).total_cmp(&popularity_score(&a.candidate))
    });

    let institutions: Vec<RankedInstitution> = ranked
        .into_iter()
        .take(limit)
        .map(|s| shape(s, minutes_per_km, property))
        .collect();

    info!(
        review_threshold = threshold,
        selected = institutions.len(),
        "institutions ranked"
    );

    Selection {
        review_threshold: Some(threshold),
        institutions,
    }
}

/// Build the output record. Only the first address line describes the
/// institution; the rest is copied from the property's address.
fn shape(
    scored: &ScoredCandidate,
    minutes_per_km: f64,
    property: &StructuredAddress,
) -> RankedInstitution {
    let candidate = &scored.candidate;
    let address_line1 = candidate
        .vicinity
        .as_deref()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(candidate.name.as_str())
        .to_string();

    RankedInstitution {
        name: candidate.name.clone(),
        address: InstitutionAddress {
            address_line1,
            town_city: property.town_city.clone(),
            county: property.county.clone(),
            eircode: property.eircode.clone(),
        },
        distance: scored.distance_m,
        avg_time_by_car: avg_time_by_car(scored.distance_m, minutes_per_km),
        rating: candidate.rating,
        total_reviews: candidate.user_ratings_total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::candidate;
    use unifind_shared::STATUS_OK;

    const LADDER: [u32; 3] = [50, 25, 10];

    fn property() -> StructuredAddress {
        StructuredAddress {
            address_line1: "4 Quay St".into(),
            address_line2: None,
            town_city: "Galway".into(),
            county: "Galway".into(),
            eircode: "H91 AB12".into(),
        }
    }

    fn scored(c: InstitutionCandidate, distance_m: u64) -> ScoredCandidate {
        ScoredCandidate {
            candidate: c,
            distance_m,
        }
    }

    fn ok(meters: u64) -> DistanceElement {
        DistanceElement {
            status: STATUS_OK.into(),
            distance_meters: Some(meters),
        }
    }

    #[test]
    fn avg_time_formula() {
        assert_eq!(avg_time_by_car(10_000, 1.5), 15);
        assert_eq!(avg_time_by_car(1, 1.5), 1);
        assert_eq!(avg_time_by_car(0, 1.5), 0);
        assert_eq!(avg_time_by_car(2_500, 1.5), 4);
    }

    #[test]
    fn missing_or_failed_distances_become_zero() {
        let candidates = vec![
            candidate("A", 53.1, 100, 4.0),
            candidate("B", 53.2, 100, 4.0),
            candidate("C", 53.3, 100, 4.0),
            candidate("D", 53.4, 100, 4.0),
        ];
        let elements = vec![
            ok(1200),
            DistanceElement::failed(),
            DistanceElement {
                status: STATUS_OK.into(),
                distance_meters: None,
            },
        ];

        let distances: Vec<u64> = attach_distances(candidates, &elements)
            .iter()
            .map(|s| s.distance_m)
            .collect();
        assert_eq!(distances, vec![1200, 0, 0, 0]);
    }

    #[test]
    fn secondary_school_detection() {
        let mut school = candidate("St. Mary's Secondary", 53.1, 80, 4.5);
        school.types = vec!["school".into(), "establishment".into()];
        assert!(is_likely_secondary_school(&school));

        let mut secondary = candidate("Gaelcholáiste", 53.1, 80, 4.5);
        secondary.types = vec!["secondary_school".into()];
        assert!(is_likely_secondary_school(&secondary));

        let mut named_college = candidate("Galway Community COLLEGE", 53.1, 80, 4.5);
        named_college.types = vec!["school".into()];
        assert!(!is_likely_secondary_school(&named_college));

        let mut typed_university = candidate("NUI Galway", 53.1, 80, 4.5);
        typed_university.types = vec!["school".into(), "university".into()];
        assert!(!is_likely_secondary_school(&typed_university));

        let mut not_a_school = candidate("Institute of Art", 53.1, 80, 4.5);
        not_a_school.types = vec!["point_of_interest".into()];
        assert!(!is_likely_secondary_school(&not_a_school));
    }

    #[test]
    fn relaxed_thresholds_are_supersets() {
        let pool: Vec<ScoredCandidate> = [0, 9, 10, 24, 25, 49, 50, 500]
            .iter()
            .enumerate()
            .map(|(i, &reviews)| {
                let mut c = candidate(&format!("U{i}"), 53.0, reviews, 4.0);
                if reviews == 0 {
                    c.user_ratings_total = None;
                }
                scored(c, 0)
            })
            .collect();

        let names = |min| -> Vec<String> {
            survivors(&pool, min)
                .into_iter()
                .map(|s| s.candidate.name.clone())
                .collect()
        };
        let at_50 = names(50);
        let at_25 = names(25);
        let at_10 = names(10);

        assert_eq!(at_50.len(), 2);
        assert_eq!(at_25.len(), 4);
        assert_eq!(at_10.len(), 6);
        assert!(at_50.iter().all(|n| at_25.contains(n)));
        assert!(at_25.iter().all(|n| at_10.contains(n)));
    }

    #[test]
    fn ladder_relaxes_until_something_survives() {
        let pool = vec![
            scored(candidate("Small", 53.0, 30, 5.0), 0),
            scored(candidate("Tiny", 53.0, 12, 5.0), 0),
        ];
        let selection = rank_and_select(pool, &LADDER, 5, 1.5, &property());
        assert_eq!(selection.review_threshold, Some(25));
        assert_eq!(selection.institutions.len(), 1);
        assert_eq!(selection.institutions[0].name, "Small");
    }

    #[test]
    fn ladder_never_goes_below_last_step() {
        let pool = vec![scored(candidate("Unknown", 53.0, 9, 5.0), 0)];
        let selection = rank_and_select(pool, &LADDER, 5, 1.5, &property());
        assert_eq!(selection.review_threshold, None);
        assert!(selection.institutions.is_empty());
    }

    #[test]
    fn ranks_by_rating_times_reviews() {
        let pool = vec![
            scored(candidate("Five Star", 53.0, 60, 5.0), 0),
            scored(candidate("Popular", 53.0, 1000, 3.0), 0),
            scored(candidate("Middling", 53.0, 200, 4.0), 0),
        ];
        let selection = rank_and_select(pool, &LADDER, 5, 1.5, &property());
        let order: Vec<&str> = selection.institutions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["Popular", "Middling", "Five Star"]);
    }

    #[test]
    fn ties_keep_input_order() {
        let pool = vec![
            scored(candidate("First", 53.0, 100, 4.0), 0),
            scored(candidate("Second", 53.0, 200, 2.0), 0),
            scored(candidate("Third", 53.0, 400, 1.0), 0),
        ];
        let first = rank_and_select(pool.clone(), &LADDER, 5, 1.5, &property());
        let again = rank_and_select(pool, &LADDER, 5, 1.5, &property());
        let order: Vec<&str> = first.institutions.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(order, vec!["First", "Second", "Third"]);
        assert_eq!(first.institutions, again.institutions);
    }

    #[test]
    fn limit_caps_output() {
        let pool: Vec<ScoredCandidate> = (0..7)
            .map(|i| scored(candidate(&format!("U{i}"), 53.0, 100 + i, 4.0), 0))
            .collect();

        for limit in [0, 1, 5, 7, 10] {
            let selection = rank_and_select(pool.clone(), &LADDER, limit, 1.5, &property());
            assert_eq!(selection.institutions.len(), limit.min(7));
        }
    }

    #[test]
    fn shapes_output_with_property_address() {
        let mut with_vicinity = candidate("University of Galway", 53.27, 3000, 4.5);
        with_vicinity.vicinity = Some("University Road".into());
        let mut without_vicinity = candidate("ATU Galway", 53.28, 400, 4.1);
        without_vicinity.vicinity = None;
        without_vicinity.rating = None;

        let pool = vec![scored(with_vicinity, 10_000), scored(without_vicinity, 2_500)];
        let selection = rank_and_select(pool, &LADDER, 5, 1.5, &property());

        let first = &selection.institutions[0];
        assert_eq!(first.address.address_line1, "University Road");
        assert_eq!(first.address.town_city, "Galway");
        assert_eq!(first.address.eircode, "H91 AB12");
        assert_eq!(first.distance, 10_000);
        assert_eq!(first.avg_time_by_car, 15);
        assert_eq!(first.rating, Some(4.5));
        assert_eq!(first.total_reviews, Some(3000));

        let second = &selection.institutions[1];
        assert_eq!(second.address.address_line1, "ATU Galway");
        assert_eq!(second.rating, None);
        assert_eq!(second.avg_time_by_car, 4);
    }

    #[test]
    fn schools_are_excluded_before_the_gate() {
        let mut school = candidate("Coláiste Iognáid", 53.0, 5000, 4.9);
        school.types = vec!["secondary_school".into()];
        let pool = vec![
            scored(school, 0),
            scored(candidate("Real University", 53.0, 60, 4.0), 0),
        ];
        let selection = rank_and_select(pool, &LADDER, 5, 1.5, &property());
        assert_eq!(selection.institutions.len(), 1);
        assert_eq!(selection.institutions[0].name, "Real University");
    }
}
