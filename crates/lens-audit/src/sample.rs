/// Deliberately under-specified plan for trying the tool out.
pub const SAMPLE_PLAN: &str = "Project: Cloud Migration 2.0
Objective: Move all legacy databases to the cloud by end of month.
Team: Engineering Dept (Everyone will help).
Timeline: 4 weeks.
Tasks:
1. Setup cloud environment.
2. Migration scripts.
3. Actual migration.
4. Testing.

Constraints: Budget is tight, so we use minimal staging instances. No specific owner assigned yet but John from DevOps usually handles this stuff.";
