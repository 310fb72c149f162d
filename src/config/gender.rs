// src/config/gender.rs
use super::{
    default_score_bins, BreakdownSpec, Bucket, BucketRate, ConsentRule, CrosstabSpec,
    IndicatorSpec, LoaderConfig, MatchRule, Measure, QualityConfig, Rubric, RubricItem,
    SurveySchema, UnitConfig, UnitSignal,
};

pub(super) fn gender_survey() -> SurveySchema {
    SurveySchema {
        loader: LoaderConfig::default(),
        consent: Some(ConsentRule {
            column: "consent".into(),
            affirmative: "oui".into(),
        }),
        timestamp_column: Some("_submission_time".into()),
        indicators: indicators(),
        breakdowns: breakdowns(),
        rubric: Rubric {
            items: vec![
                RubricItem {
                    column: "compr_genre".into(),
                    full: vec!["bonne".into()],
                    partial: vec!["moyenne".into()],
                    weight: 1.0,
                    partial_weight: 0.5,
                },
                full_credit("diff_sexe_genre", "oui"),
                full_credit("genre_biologique", "faux"),
                full_credit("politiques_genre_connaissance", "oui"),
                full_credit("gtg_connaissance", "oui"),
            ],
            bins: default_score_bins(),
        },
        units: Some(UnitConfig {
            column: "ministere".into(),
            trained: MatchRule {
                column: "formation_genre".into(),
                value: "oui".into(),
            },
            focal_point: UnitSignal {
                flag_columns: vec!["cellule_genre".into()],
                positive_columns: vec!["nb_points_focaux".into()],
                affirmative: "oui".into(),
            },
            integration: UnitSignal {
                flag_columns: vec!["plan_action_genre".into(), "indicateurs_genre".into()],
                positive_columns: vec!["budget_genre_annuel".into()],
                affirmative: "oui".into(),
            },
        }),
        crosstabs: vec![
            crosstab("sexe_x_formation_genre", "sexe", "formation_genre"),
            crosstab("sexe_x_compr_genre", "sexe", "compr_genre"),
            crosstab("fonction_x_formation_genre", "fonction", "formation_genre"),
        ],
        quality: QualityConfig::default(),
    }
}

fn indicators() -> Vec<IndicatorSpec> {
    vec![
        indicator("total_responses", Measure::Total),
        indicator("female_respondents", count("sexe", "feminin")),
        indicator("male_respondents", count("sexe", "masculin")),
        indicator("pct_female", rate("sexe", "feminin")),
        indicator("pct_male", rate("sexe", "masculin")),
        indicator(
            "ministries_covered",
            Measure::Distinct {
                column: "ministere".into(),
            },
        ),
        indicator("trained_on_gender", yes_no("formation_genre")),
        indicator(
            "gender_knowledge",
            Measure::Buckets {
                column: "compr_genre".into(),
                buckets: vec![
                    bucket("good", "bonne"),
                    bucket("average", "moyenne"),
                    bucket("low", "faible"),
                ],
                rate: None,
            },
        ),
        indicator("knows_sex_gender_difference", yes_no("diff_sexe_genre")),
        indicator(
            "genre_not_biological_correct",
            Measure::Buckets {
                column: "genre_biologique".into(),
                buckets: vec![bucket("correct", "faux"), bucket("incorrect", "vrai")],
                rate: Some(BucketRate {
                    key: "pct_correct".into(),
                    bucket: "correct".into(),
                }),
            },
        ),
        indicator("knows_gender_policies", yes_no("politiques_genre_connaissance")),
        indicator(
            "gender_important_public_policies",
            yes_no("importance_genre_politiques_publiques"),
        ),
        indicator("has_gender_unit", yes_no("cellule_genre")),
        indicator("has_gender_action_plan", yes_no_partial("plan_action_genre")),
        indicator("has_gender_indicators", yes_no_partial("indicateurs_genre")),
        indicator("has_gender_guides", yes_no("outils_guide_genre")),
        indicator(
            "gender_budget",
            Measure::Numeric {
                column: "budget_genre_annuel".into(),
                present_key: "with_budget".into(),
                absent_key: "without_budget".into(),
                mean_key: "avg_budget_pct".into(),
            },
        ),
        indicator("knows_GTG", yes_no("gtg_connaissance")),
        indicator("knowledge_score_avg", Measure::ScoreMean),
    ]
}

fn breakdowns() -> Vec<BreakdownSpec> {
    vec![
        single("by_ministere", "ministere", 80),
        single("by_sexe", "sexe", 10),
        single("by_fonction", "fonction", 30),
        single("by_compr_genre", "compr_genre", 10),
        single("by_formation_genre", "formation_genre", 10),
        single("by_diff_sexe_genre", "diff_sexe_genre", 10),
        single("by_cellule_genre", "cellule_genre", 10),
        single("by_plan_action_genre", "plan_action_genre", 10),
        single("by_indicateurs_genre", "indicateurs_genre", 10),
        single("by_outils_guide_genre", "outils_guide_genre", 10),
        single("by_frequence_formations", "frequence_formations_genre", 10),
        single("by_importance_secteur", "importance_genre_secteur", 10),
        BreakdownSpec::Multi {
            name: "obstacles".into(),
            column: "obstacles".into(),
            top: 50,
            codes: (1..=8).map(|i| format!("obs{}", i)).collect(),
        },
        BreakdownSpec::Multi {
            name: "actions".into(),
            column: "actions".into(),
            top: 50,
            codes: Vec::new(),
        },
        BreakdownSpec::ScoreBins {
            name: "score_bins".into(),
        },
    ]
}

fn indicator(name: &str, measure: Measure) -> IndicatorSpec {
    IndicatorSpec {
        name: name.into(),
        measure,
    }
}

fn count(column: &str, value: &str) -> Measure {
    Measure::Count {
        column: column.into(),
        value: value.into(),
    }
}

fn rate(column: &str, value: &str) -> Measure {
    Measure::Rate {
        column: column.into(),
        value: value.into(),
    }
}

fn bucket(key: &str, value: &str) -> Bucket {
    Bucket {
        key: key.into(),
        values: vec![value.into()],
    }
}

fn yes_no(column: &str) -> Measure {
    Measure::Buckets {
        column: column.into(),
        buckets: vec![bucket("yes", "oui"), bucket("no", "non")],
        rate: Some(BucketRate {
            key: "pct_yes".into(),
            bucket: "yes".into(),
        }),
    }
}

fn yes_no_partial(column: &str) -> Measure {
    Measure::Buckets {
        column: column.into(),
        buckets: vec![
            bucket("yes", "oui"),
            bucket("no", "non"),
            bucket("partial", "np"),
        ],
        rate: None,
    }
}

fn single(name: &str, column: &str, top: usize) -> BreakdownSpec {
    BreakdownSpec::Single {
        name: name.into(),
        column: column.into(),
        top,
    }
}

fn full_credit(column: &str, value: &str) -> RubricItem {
    RubricItem {
        column: column.into(),
        full: vec![value.into()],
        partial: Vec::new(),
        weight: 1.0,
        partial_weight: 0.5,
    }
}

fn crosstab(name: &str, rows: &str, cols: &str) -> CrosstabSpec {
    CrosstabSpec {
        name: name.into(),
        rows: rows.into(),
        cols: cols.into(),
    }
}
