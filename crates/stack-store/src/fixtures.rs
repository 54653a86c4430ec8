//! Seed data for the demo workspace.

use chrono::{DateTime, NaiveDate, Utc};

use stack_types::models::{AiSummary, Channel, Message, User};

/// Alice is the signed-in user for the demo.
pub const CURRENT_USER_ID: &str = "u01";

pub fn users() -> Vec<User> {
    [
        ("u01", "Alice Johnson", "Alice"),
        ("u02", "Bob Smith", "Bob"),
        ("u03", "Carol Martinez", "Carol"),
        ("u04", "David Chen", "David"),
        ("u05", "Emma Wilson", "Emma"),
    ]
    .into_iter()
    .map(|(id, name, seed)| User {
        id: id.to_string(),
        name: name.to_string(),
        avatar_url: format!("https://api.dicebear.com/7.x/avataaars/svg?seed={}", seed),
    })
    .collect()
}

pub fn channels() -> Vec<Channel> {
    [
        ("c01", "project-alpha", "Project Alpha development and coordination"),
        ("c02", "general", "Company-wide announcements and general discussion"),
        ("c03", "random", "Non-work-related conversations and fun"),
        ("c04", "design", "Design team collaboration"),
    ]
    .into_iter()
    .map(|(id, name, description)| Channel {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
    })
    .collect()
}

pub fn messages() -> Vec<Message> {
    [
        // Project Alpha carries most of the demo narrative
        ("m01", "u02", "c01", (8, 30), "Morning team! Quick update: backend API deployment went smoothly last night. All endpoints are now live on staging."),
        ("m02", "u03", "c01", (8, 45), "Great work @Bob! I've started testing the authentication flow. Found one small issue with the password reset email - the link is returning a 404."),
        ("m03", "u02", "c01", (8, 50), "Thanks for catching that @Carol. I'll look into the routing config. Should have a fix by noon."),
        ("m04", "u04", "c01", (9, 15), "FYI - I've updated the database schema to support user roles. Migration scripts are in the repo. Please run them on your local environments."),
        ("m05", "u05", "c01", (9, 30), "Design files for the new dashboard are ready! Check Figma for the latest mockups. @Alice would love your feedback on the color scheme."),
        ("m06", "u01", "c01", (10, 0), "Looking at the designs now @Emma - they look fantastic! The color palette is much more accessible than v1."),
        ("m07", "u03", "c01", (10, 45), "Quick heads up: QA testing revealed that the mobile layout breaks on devices smaller than 375px width. Adding a fix to the sprint."),
        ("m08", "u02", "c01", (11, 20), "Password reset bug is fixed! Also added better error logging so we can catch these earlier. Deployed to staging."),
        ("m09", "u04", "c01", (11, 45), "Database performance is looking good after the optimization. Query time reduced by 60%. Stats dashboard shows everything in the green."),
        ("m10", "u05", "c01", (12, 30), "Just merged the new icon set into main. Matches our updated brand guidelines perfectly."),
        ("m11", "u01", "c01", (13, 0), "Team sync at 2 PM today - let's review the sprint progress and plan for next week's release."),
        ("m12", "u03", "c01", (13, 15), "Added test coverage for the new authentication module. We're now at 87% overall coverage 🎉"),
        ("m13", "u02", "c01", (13, 45), "@David can you review PR #234? It's the role-based access control implementation."),
        ("m14", "u04", "c01", (14, 0), "On it @Bob! Will review and provide feedback within the hour."),
        ("m15", "u05", "c01", (14, 30), "User research session scheduled for Thursday. We'll be testing the new onboarding flow with 5 participants."),
        ("m16", "u02", "c02", (9, 0), "Reminder: Company all-hands meeting is tomorrow at 10 AM."),
        ("m17", "u05", "c02", (11, 0), "New coffee machine in the break room! ☕"),
        ("m18", "u03", "c03", (12, 0), "Anyone want to grab lunch? Thinking of trying that new taco place."),
        ("m19", "u05", "c04", (10, 30), "Updated the design system documentation. Check it out at /design-system"),
    ]
    .into_iter()
    .map(|(id, user_id, channel_id, (hour, minute), content)| Message {
        id: id.to_string(),
        user_id: user_id.to_string(),
        channel_id: channel_id.to_string(),
        timestamp: seed_time(hour, minute),
        content: content.to_string(),
    })
    .collect()
}

pub fn summaries() -> Vec<AiSummary> {
    vec![
        AiSummary {
            channel_id: "c01".to_string(),
            content: PROJECT_ALPHA_SUMMARY.to_string(),
        },
        AiSummary {
            channel_id: "c02".to_string(),
            content: GENERAL_SUMMARY.to_string(),
        },
    ]
}

/// All seed messages were posted on 2025-10-27 (UTC).
fn seed_time(hour: u32, minute: u32) -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2025, 10, 27)
        .and_then(|date| date.and_hms_opt(hour, minute, 0))
        .map(|naive| naive.and_utc())
        .expect("fixture timestamps are valid")
}

const PROJECT_ALPHA_SUMMARY: &str = "# Project Alpha - Daily Summary

## 🎯 Key Decisions
- Backend API successfully deployed to staging environment
- Database schema updated to support user role management
- New design system with improved accessibility approved and implemented

## ✅ Completed Tasks
- **Backend**: API deployment complete, password reset bug fixed, error logging improved
- **Database**: Schema migration for user roles, performance optimization (60% faster queries)
- **Design**: New dashboard mockups finalized, icon set merged, brand guidelines updated
- **QA**: Test coverage increased to 87%, mobile layout issue identified

## 🚧 In Progress
- Role-based access control implementation (PR #234 under review)
- Mobile layout fix for devices <375px width
- Database migration scripts being deployed to local environments

## 📅 Upcoming
- Team sync meeting at 2 PM to review sprint progress
- User research session scheduled for Thursday (testing onboarding flow)
- Sprint planning for next week's release

## 👥 Active Contributors
- Bob: Backend development and API fixes
- Carol: QA testing and test coverage
- David: Database optimization and PR reviews
- Emma: Design system and user research
- Alice: Project coordination and design feedback

## 🎉 Wins
- 60% improvement in database query performance
- 87% test coverage achieved
- Successful staging deployment with zero downtime";

const GENERAL_SUMMARY: &str = "# General Channel Summary

## 📢 Announcements
- Company all-hands meeting scheduled for tomorrow at 10 AM
- New coffee machine installed in the break room";
