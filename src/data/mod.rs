/// Data layer: event rows, loading, and grouping.
///
/// Architecture:
/// ```text
///  events_*.txt
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse lines → EventDataset (rows, event count, skipped)
///   └──────────┘
///        │
///        ▼
///   ┌──────────────┐
///   │ EventDataset  │  Vec<EventRow>, RUNDETAILS total
///   └──────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  group    │  CMS mass → species → energies
///   └──────────┘
/// ```

pub mod group;
pub mod loader;
pub mod model;
