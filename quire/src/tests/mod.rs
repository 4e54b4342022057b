// Copyright 2026 the Quire Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod test_break;
mod test_metrics;
mod test_row;
mod utils;
