// Copyright (c) Microsoft Corporation.
// Licensed under the MIT license.

pub mod protocols;

#[cfg(test)]
pub mod test_helpers;
