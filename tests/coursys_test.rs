use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::extract::{RawQuery, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::NaiveDate;
use serde_json::json;

use courseplanner_offerings::history::HistoryRange;
use courseplanner_offerings::sources::{CourSysClient, MemorySources};
use courseplanner_offerings::{
    AboutInfo, AggregatorSettings, Course, Department, EngineError, FixedClock, OfferingAggregator,
};

const DEADLINE: Duration = Duration::from_millis(500);

// ---

/// Stand-in for the CourSys browse endpoint.
#[derive(Clone)]
struct FakeCourSys {
    latency: Duration,
    /// Semester answered with 404 instead of a section row.
    withdrawn: Option<u16>,
}

async fn browse(RawQuery(query): RawQuery, State(fake): State<FakeCourSys>) -> Response {
    // ---
    tokio::time::sleep(fake.latency).await;

    let query = query.unwrap_or_default();
    if let Some(code) = fake.withdrawn {
        if query.contains(&format!("={code}")) {
            return (StatusCode::NOT_FOUND, "semester not found").into_response();
        }
    }

    Json(json!({
        "data": [[
            "term",
            "<a href=\"/browse/info/cmpt-276-d1\">CMPT 276 D100</a>",
            "Introduction to Software Engineering",
            "90/100",
            "Jane Doe",
            "Burnaby"
        ]]
    }))
    .into_response()
}

async fn spawn_coursys(fake: FakeCourSys) -> Result<String> {
    // ---
    let app = Router::new().route("/browse/", get(browse)).with_state(fake);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    Ok(format!("http://{}/browse/", addr))
}

async fn aggregator_against(fake: FakeCourSys) -> Result<OfferingAggregator> {
    // ---
    let url = spawn_coursys(fake).await?;
    let coursys = CourSysClient::new(url, DEADLINE, 4)?;

    let catalog = Arc::new(
        MemorySources::new()
            .with_department(Department {
                dept_id: 1,
                dept_code: "CMPT".to_string(),
                name: "Computing Science".to_string(),
            })
            .with_course(Course {
                course_id: 42,
                dept_id: 1,
                course_number: "276".to_string(),
                title: Some("Introduction to Software Engineering".to_string()),
                description: None,
                units: Some(3),
                degree_level: Some("UGRD".to_string()),
                prerequisites: None,
                corequisites: None,
                designation: None,
            }),
    );

    Ok(OfferingAggregator::new(
        catalog.clone(),
        Arc::new(coursys),
        catalog,
        // Fall 2025 in session, so windows end at Spring 2026
        Arc::new(FixedClock(NaiveDate::from_ymd_opt(2025, 10, 19).unwrap())),
        AggregatorSettings {
            about: AboutInfo {
                app_name: "CoursePlanner".to_string(),
                author_name: "Anonymous".to_string(),
            },
            outline_base_url: "https://www.sfu.ca/outlines.html".to_string(),
            upstream_timeout: DEADLINE,
        },
    ))
}

#[tokio::test]
async fn slow_coursys_window_within_per_request_deadline() -> Result<()> {
    // ---
    // 200ms per request: every call meets the deadline, but 12 or 15 calls at
    // concurrency 4 take longer than one deadline in total
    let aggregator = aggregator_against(FakeCourSys {
        latency: Duration::from_millis(200),
        withdrawn: None,
    })
    .await?;

    let offerings = aggregator.list_offerings(1, 42).await?;
    assert_eq!(offerings.len(), 12);
    assert_eq!(offerings[0].semester_code.get(), 1261);
    assert_eq!(offerings[0].load_percent, Some(90));

    let points = aggregator
        .enrollment_history(1, 42, HistoryRange::FiveYears)
        .await?;
    assert_eq!(points.len(), 15);
    assert!(points.iter().all(|p| p.load_percent == 90.0));

    let detail = aggregator.get_offering_detail(1, 42, 1257).await?;
    assert_eq!(detail.sections.len(), 1);

    Ok(())
}

#[tokio::test]
async fn coursys_request_over_deadline_fails() -> Result<()> {
    // ---
    let aggregator = aggregator_against(FakeCourSys {
        latency: Duration::from_millis(900),
        withdrawn: None,
    })
    .await?;

    let err = aggregator.list_offerings(1, 42).await.unwrap_err();
    assert!(matches!(
        err,
        EngineError::UpstreamUnavailable {
            source_name: "enrollment",
            ..
        }
    ));

    let err = aggregator.get_offering_detail(1, 42, 1257).await.unwrap_err();
    assert!(!err.is_client_error());

    Ok(())
}

#[tokio::test]
async fn withdrawn_semester_is_empty_not_fatal() -> Result<()> {
    // ---
    let aggregator = aggregator_against(FakeCourSys {
        latency: Duration::ZERO,
        withdrawn: Some(1254),
    })
    .await?;

    let offerings = aggregator.list_offerings(1, 42).await?;
    assert_eq!(offerings.len(), 11);
    assert!(offerings.iter().all(|o| o.semester_code.get() != 1254));

    let points = aggregator
        .enrollment_history(1, 42, HistoryRange::OneYear)
        .await?;
    let codes: Vec<u16> = points.iter().map(|p| p.semester_code.get()).collect();
    assert_eq!(codes, vec![1257, 1261]);

    // A single-semester lookup still reports the refusal
    let err = aggregator.get_offering_detail(1, 42, 1254).await.unwrap_err();
    assert!(matches!(err, EngineError::UpstreamUnavailable { .. }));

    Ok(())
}
