// MEDIASCOUT Library Root
// Copyright (c) 2026 MediaScout_Dev | MEDIASCOUT

pub mod agent;
