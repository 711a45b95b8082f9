//! Scripted stand-ins for the algorithm demo pages.
//!
//! Each blueprint keeps its state in page globals so every fresh page starts
//! from the same seed, and renders the same selectors the page objects use.

#![allow(dead_code)]
#![allow(clippy::unwrap_used, clippy::expect_used)]

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use vizprobe::{DomState, ElementSnapshot as El, HarnessConfig, PageBlueprint, ScriptedSite};

// ============================================================================
// Site and config
// ============================================================================

/// Every demo page at its default path
pub fn demo_site() -> ScriptedSite {
    ScriptedSite::new()
        .with_page(bubble_sort("/bubble_sort.html"))
        .with_page(counting_sort("/counting_sort.html"))
        .with_page(priority_queue("/priority_queue.html"))
        .with_page(knapsack("/knapsack.html"))
        .with_page(bfs("/bfs.html"))
}

/// Short timeouts; scripted pages settle synchronously
pub fn fast_config(artifacts: &Path) -> HarnessConfig {
    let mut config = HarnessConfig::default();
    config.timeouts.action_ms = 200;
    config.timeouts.wait_ms = 200;
    config.timeouts.poll_interval_ms = 5;
    config.timeouts.scenario_ms = 5_000;
    config.artifacts_dir = artifacts.to_path_buf();
    config
}

fn lcg(seed: u64) -> u64 {
    seed.wrapping_mul(6_364_136_223_846_793_005)
        .wrapping_add(1_442_695_040_888_963_407)
}

// ============================================================================
// Bubble sort
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct BubbleState {
    initial: Vec<u32>,
    values: Vec<u32>,
    descending: bool,
    pass: usize,
    j: usize,
    comparisons: usize,
    swaps: usize,
    done: bool,
}

impl BubbleState {
    fn restart(&mut self) {
        self.values = self.initial.clone();
        self.pass = 0;
        self.j = 0;
        self.comparisons = 0;
        self.swaps = 0;
        self.done = self.values.len() < 2;
    }

    fn step(&mut self) {
        if self.done {
            return;
        }
        let n = self.values.len();
        let (a, b) = (self.values[self.j], self.values[self.j + 1]);
        self.comparisons += 1;
        let out_of_order = if self.descending { a < b } else { a > b };
        if out_of_order {
            self.values.swap(self.j, self.j + 1);
            self.swaps += 1;
        }
        self.j += 1;
        if self.j >= n - 1 - self.pass {
            self.pass += 1;
            self.j = 0;
            self.done = self.pass >= n - 1;
        }
    }
}

fn bubble_state(dom: &DomState) -> BubbleState {
    dom.global("bubble").unwrap_or_default()
}

fn render_bubble(dom: &mut DomState, state: BubbleState, marks_sorted: bool) {
    let n = state.values.len();
    let bars = state
        .values
        .iter()
        .enumerate()
        .map(|(i, v)| {
            let bar = El::new("div")
                .with_class("bar")
                .with_text(v.to_string())
                .with_style("height", format!("{}px", v * 3));
            if marks_sorted && (state.done || i >= n - state.pass) {
                bar.with_class("sorted")
            } else {
                bar
            }
        })
        .collect();
    dom.set_elements(".bar", bars);
    dom.set_text("#comparisons", format!("Comparisons: {}", state.comparisons));
    dom.set_text("#swaps", format!("Swaps: {}", state.swaps));
    dom.set_text("#status", if state.done { "Sorted" } else { "Ready" });
    dom.set_global("bubble", state);
}

fn shuffle(dom: &mut DomState, n: usize, marks_sorted: bool) {
    let mut seed: u64 = dom.global("seed").unwrap_or(42);
    let values: Vec<u32> = (0..n)
        .map(|_| {
            seed = lcg(seed);
            5 + ((seed >> 33) % 96) as u32
        })
        .collect();
    dom.set_global("seed", seed);
    let mut state = bubble_state(dom);
    state.initial = values;
    state.restart();
    render_bubble(dom, state, marks_sorted);
}

fn bubble_blueprint(path: &str, marks_sorted: bool) -> PageBlueprint {
    PageBlueprint::builder(path)
        .element("#size", El::new("input").with_value("28"))
        .element("#order", El::new("select").with_value("asc"))
        .element("#randomize", El::new("button").with_text("Randomize"))
        .element("#step", El::new("button").with_text("Step"))
        .element("#reset", El::new("button").with_text("Reset"))
        .element("#status", El::new("p"))
        .element("#comparisons", El::new("span"))
        .element("#swaps", El::new("span"))
        .on_load(move |dom| {
            let n = dom.value("#size").parse().unwrap_or(0);
            shuffle(dom, n, marks_sorted);
        })
        .on_fill("#size", move |dom| {
            let n = dom.value("#size").parse().unwrap_or(0);
            shuffle(dom, n, marks_sorted);
        })
        .on_click("#randomize", move |dom| {
            let n = bubble_state(dom).initial.len();
            shuffle(dom, n, marks_sorted);
        })
        .on_change("#order", move |dom| {
            let mut state = bubble_state(dom);
            state.descending = dom.value("#order") == "desc";
            state.restart();
            render_bubble(dom, state, marks_sorted);
        })
        .on_click("#reset", move |dom| {
            let mut state = bubble_state(dom);
            state.restart();
            render_bubble(dom, state, marks_sorted);
        })
        .on_click("#step", move |dom| {
            let mut state = bubble_state(dom);
            state.step();
            render_bubble(dom, state, marks_sorted);
        })
        .build()
}

/// Bubble sort visualizer
pub fn bubble_sort(path: &str) -> PageBlueprint {
    bubble_blueprint(path, true)
}

/// Bubble sort page that sorts but never marks bars sorted
pub fn stuck_bubble_sort(path: &str) -> PageBlueprint {
    bubble_blueprint(path, false)
}

// ============================================================================
// Counting sort
// ============================================================================

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
enum Phase {
    #[default]
    Count,
    Accumulate,
    Place,
    Done,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct CountingState {
    input: Vec<usize>,
    counts: Vec<usize>,
    output: Vec<Option<usize>>,
    phase: Phase,
    cursor: usize,
}

impl CountingState {
    fn load(input: Vec<usize>) -> Self {
        let size = input.iter().max().map_or(0, |m| m + 1);
        Self {
            counts: vec![0; size],
            output: vec![None; input.len()],
            phase: if input.is_empty() { Phase::Done } else { Phase::Count },
            input,
            cursor: 0,
        }
    }

    /// One visible action; returns its log line
    fn step(&mut self) -> Option<String> {
        loop {
            match self.phase {
                Phase::Count if self.cursor < self.input.len() => {
                    let v = self.input[self.cursor];
                    self.counts[v] += 1;
                    self.cursor += 1;
                    return Some(format!("Counting value {v} at index {}", self.cursor - 1));
                }
                Phase::Count => {
                    self.phase = Phase::Accumulate;
                    self.cursor = 1;
                }
                Phase::Accumulate if self.cursor < self.counts.len() => {
                    let c = self.cursor;
                    self.counts[c] += self.counts[c - 1];
                    self.cursor += 1;
                    return Some(format!("Accumulate: count[{c}] = {}", self.counts[c]));
                }
                Phase::Accumulate => {
                    self.phase = Phase::Place;
                    self.cursor = self.input.len();
                }
                Phase::Place => {
                    self.cursor -= 1;
                    let v = self.input[self.cursor];
                    self.counts[v] -= 1;
                    let at = self.counts[v];
                    self.output[at] = Some(v);
                    if self.cursor == 0 {
                        self.phase = Phase::Done;
                    }
                    return Some(format!("Place {v} at position {at}"));
                }
                Phase::Done => return None,
            }
        }
    }
}

fn render_counting(dom: &mut DomState, state: CountingState) {
    let counts = state
        .counts
        .iter()
        .map(|c| El::new("div").with_class("count-bar").with_text(c.to_string()))
        .collect();
    dom.set_elements("#countArray .count-bar", counts);
    let cells = state
        .output
        .iter()
        .map(|v| {
            El::new("div")
                .with_class("cell")
                .with_text(v.map(|v| v.to_string()).unwrap_or_default())
        })
        .collect();
    dom.set_elements("#outputArray .cell", cells);
    let status = match state.phase {
        Phase::Done => "Sorted",
        Phase::Count => "Counting",
        Phase::Accumulate => "Accumulating",
        Phase::Place => "Placing",
    };
    dom.set_text("#status", status);
    dom.set_global("counting", state);
}

fn counting_blueprint(path: &str, throws_on_load: bool) -> PageBlueprint {
    PageBlueprint::builder(path)
        .element("#arrayInput", El::new("input").with_value(""))
        .element("#load", El::new("button").with_text("Load"))
        .element("#step", El::new("button").with_text("Step"))
        .element("#status", El::new("p").with_text("Ready"))
        .on_load(move |dom| {
            if throws_on_load {
                dom.throw("TypeError: Cannot read properties of undefined (reading 'length')");
            }
        })
        .on_click("#load", |dom| {
            let input: Vec<usize> = dom
                .value("#arrayInput")
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            dom.set_elements("#log .log-entry", Vec::new());
            render_counting(dom, CountingState::load(input));
        })
        .on_click("#step", |dom| {
            let Some(mut state) = dom.global::<CountingState>("counting") else {
                return;
            };
            if let Some(line) = state.step() {
                dom.push_element(
                    &["#log .log-entry"],
                    El::new("div").with_class("log-entry").with_text(line),
                );
            }
            render_counting(dom, state);
        })
        .build()
}

/// Counting sort visualizer
pub fn counting_sort(path: &str) -> PageBlueprint {
    counting_blueprint(path, false)
}

/// Counting sort page with an uncaught exception during load
pub fn throwing_counting_sort(path: &str) -> PageBlueprint {
    counting_blueprint(path, true)
}

// ============================================================================
// Priority queue
// ============================================================================

fn render_queue(dom: &mut DomState, items: Vec<(String, i64)>) {
    let rendered = items
        .iter()
        .map(|(label, p)| {
            El::new("li")
                .with_class("pq-item")
                .with_text(label.clone())
                .with_attribute("data-priority", p.to_string())
        })
        .collect();
    dom.set_elements("#queue .pq-item", rendered);
    dom.set_global("queue", items);
}

/// Max priority queue playground
pub fn priority_queue(path: &str) -> PageBlueprint {
    PageBlueprint::builder(path)
        .element("#itemInput", El::new("input").with_value(""))
        .element("#priorityInput", El::new("input").with_value(""))
        .element("#enqueue", El::new("button").with_text("Enqueue"))
        .element("#dequeue", El::new("button").with_text("Dequeue"))
        .element("#message", El::new("p"))
        .on_click("#enqueue", |dom| {
            let label = dom.value("#itemInput");
            let Ok(priority) = dom.value("#priorityInput").trim().parse::<i64>() else {
                dom.alert("Priority must be a number");
                return;
            };
            let mut items: Vec<(String, i64)> = dom.global("queue").unwrap_or_default();
            let at = items
                .iter()
                .position(|(_, p)| *p < priority)
                .unwrap_or(items.len());
            items.insert(at, (label.clone(), priority));
            dom.set_text("#message", format!("Enqueued {label}"));
            render_queue(dom, items);
        })
        .on_click("#dequeue", |dom| {
            let mut items: Vec<(String, i64)> = dom.global("queue").unwrap_or_default();
            if items.is_empty() {
                dom.set_text("#message", "Queue is empty");
                return;
            }
            let (label, priority) = items.remove(0);
            dom.set_text("#message", format!("Dequeued {label} (priority {priority})"));
            render_queue(dom, items);
        })
        .build()
}

// ============================================================================
// Knapsack
// ============================================================================

fn best_subset(items: &[(String, i64, i64)], capacity: usize) -> (u64, Vec<usize>) {
    let n = items.len();
    let mut table = vec![vec![0_u64; capacity + 1]; n + 1];
    for i in 1..=n {
        let (w, v) = (items[i - 1].1 as usize, items[i - 1].2 as u64);
        for c in 0..=capacity {
            table[i][c] = table[i - 1][c];
            if w <= c {
                table[i][c] = table[i][c].max(table[i - 1][c - w] + v);
            }
        }
    }
    let mut chosen = Vec::new();
    let mut c = capacity;
    for i in (1..=n).rev() {
        if table[i][c] != table[i - 1][c] {
            chosen.push(i - 1);
            c -= items[i - 1].1 as usize;
        }
    }
    chosen.reverse();
    (table[n][capacity], chosen)
}

/// 0/1 knapsack solver with input validation alerts
pub fn knapsack(path: &str) -> PageBlueprint {
    PageBlueprint::builder(path)
        .element("#itemName", El::new("input").with_value(""))
        .element("#itemWeight", El::new("input").with_value(""))
        .element("#itemValue", El::new("input").with_value(""))
        .element("#addItem", El::new("button").with_text("Add item"))
        .element("#capacity", El::new("input").with_value("10"))
        .element("#solve", El::new("button").with_text("Solve"))
        .element("#result", El::new("p"))
        .on_click("#addItem", |dom| {
            let name = dom.value("#itemName");
            let weight = dom.value("#itemWeight").trim().parse::<i64>().unwrap_or(0);
            let value = dom.value("#itemValue").trim().parse::<i64>().unwrap_or(-1);
            if weight <= 0 {
                dom.alert("Weight must be > 0");
                return;
            }
            if value < 0 {
                dom.alert("Value must be >= 0");
                return;
            }
            let mut items: Vec<(String, i64, i64)> = dom.global("items").unwrap_or_default();
            items.push((name, weight, value));
            let rows = items
                .iter()
                .map(|(n, w, v)| El::new("tr").with_text(format!("{n} {w} {v}")))
                .collect();
            dom.set_elements("#items tbody tr", rows);
            dom.set_global("items", items);
        })
        .on_click("#solve", |dom| {
            let items: Vec<(String, i64, i64)> = dom.global("items").unwrap_or_default();
            let capacity = dom.value("#capacity").trim().parse().unwrap_or(0);
            let (best, chosen) = best_subset(&items, capacity);
            let weight: i64 = chosen.iter().map(|&i| items[i].1).sum();
            dom.set_text("#result", format!("Best value: {best} (weight {weight})"));
            let selected = chosen
                .iter()
                .map(|&i| El::new("li").with_text(items[i].0.clone()))
                .collect();
            dom.set_elements("#selected li", selected);
        })
        .build()
}

// ============================================================================
// BFS
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
struct BfsState {
    queue: Vec<String>,
    discovered: Vec<String>,
    order: Vec<String>,
}

fn node_key(id: &str) -> String {
    format!(".node[data-id=\"{id}\"]")
}

fn sample_graph() -> BTreeMap<String, Vec<String>> {
    [
        ("A", vec!["B", "C"]),
        ("B", vec!["A", "D"]),
        ("C", vec!["A", "D"]),
        ("D", vec!["B", "C", "E"]),
        ("E", vec!["D"]),
        ("F", vec![]),
    ]
    .into_iter()
    .map(|(n, adj)| (n.to_string(), adj.into_iter().map(String::from).collect()))
    .collect()
}

/// Breadth-first search over a small graph with one unreachable node
pub fn bfs(path: &str) -> PageBlueprint {
    let graph = sample_graph();
    let mut builder = PageBlueprint::builder(path)
        .global("graph", &graph)
        .element("#startNode", El::new("select").with_value("A"))
        .element("#bfsStart", El::new("button").with_text("Start"))
        .element("#bfsStep", El::new("button").with_text("Step"))
        .element("#visitOrder", El::new("p"))
        .element("#status", El::new("p").with_text("Ready"));
    for id in graph.keys() {
        let key = node_key(id);
        builder = builder.element_keyed(
            &[".node", key.as_str()],
            El::new("div")
                .with_class("node")
                .with_attribute("data-id", id.clone())
                .with_text(id.clone()),
        );
    }
    builder
        .on_click("#bfsStart", |dom| {
            let start = dom.value("#startNode");
            let graph: BTreeMap<String, Vec<String>> = dom.global("graph").unwrap_or_default();
            for id in graph.keys() {
                if let Some(node) = dom.element_mut(&node_key(id)) {
                    node.classes.retain(|c| c != "visited");
                }
            }
            dom.set_text("#visitOrder", "");
            dom.set_text("#status", "Running");
            dom.set_global(
                "bfs",
                BfsState {
                    queue: vec![start.clone()],
                    discovered: vec![start],
                    order: Vec::new(),
                },
            );
        })
        .on_click("#bfsStep", |dom| {
            let Some(mut state) = dom.global::<BfsState>("bfs") else {
                return;
            };
            if state.queue.is_empty() {
                return;
            }
            let graph: BTreeMap<String, Vec<String>> = dom.global("graph").unwrap_or_default();
            let node = state.queue.remove(0);
            for next in graph.get(&node).into_iter().flatten() {
                if !state.discovered.contains(next) {
                    state.discovered.push(next.clone());
                    state.queue.push(next.clone());
                }
            }
            if let Some(el) = dom.element_mut(&node_key(&node)) {
                el.classes.push("visited".into());
            }
            state.order.push(node);
            dom.set_text("#visitOrder", state.order.join(", "));
            if state.queue.is_empty() {
                dom.set_text("#status", "BFS complete");
            }
            dom.set_global("bfs", state);
        })
        .build()
}
