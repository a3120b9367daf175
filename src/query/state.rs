// Copyright 2024 The SqlJob Client Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

/// Lifecycle of a [`Query`](crate::query::Query).
///
/// ```text
/// NotYetRun -> RunMoreDataAvail -> RunDone
///     |               |
///     +---------------+----------> Error
/// ```
///
/// A query only ever moves forward, `RunDone` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryState {
    NotYetRun,
    RunMoreDataAvail,
    RunDone,
    Error,
}

impl QueryState {
    pub fn is_terminal(self) -> bool {
        matches!(self, QueryState::RunDone | QueryState::Error)
    }

    /// Whether `next` is a legal successor of `self`.
    pub fn can_advance_to(self, next: QueryState) -> bool {
        match self {
            QueryState::NotYetRun => next != QueryState::NotYetRun,
            QueryState::RunMoreDataAvail => next != QueryState::NotYetRun,
            QueryState::RunDone | QueryState::Error => false,
        }
    }
}

impl std::fmt::Display for QueryState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            QueryState::NotYetRun => "NOT_YET_RUN",
            QueryState::RunMoreDataAvail => "RUN_MORE_DATA_AVAIL",
            QueryState::RunDone => "RUN_DONE",
            QueryState::Error => "ERROR",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::QueryState::*;

    #[test]
    fn test_transitions_only_move_forward() {
        let all = [NotYetRun, RunMoreDataAvail, RunDone, Error];
        for next in all {
            assert!(!next.can_advance_to(NotYetRun));
            assert!(!RunDone.can_advance_to(next));
            assert!(!Error.can_advance_to(next));
        }

        for next in [RunMoreDataAvail, RunDone, Error] {
            assert!(NotYetRun.can_advance_to(next));
            assert!(RunMoreDataAvail.can_advance_to(next));
        }
    }

    #[test]
    fn test_terminal() {
        assert!(!NotYetRun.is_terminal());
        assert!(!RunMoreDataAvail.is_terminal());
        assert!(RunDone.is_terminal());
        assert!(Error.is_terminal());
        assert_eq!("RUN_MORE_DATA_AVAIL", RunMoreDataAvail.to_string());
    }
}
