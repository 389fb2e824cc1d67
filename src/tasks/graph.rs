//! Task dependency graph
//!
//! `A → B` means "A requires B". Execution order comes from a depth-first walk
//! over each task's declared prerequisite list, so sibling order is the order the
//! task declares them in. petgraph backs the whole-graph queries (cycle report).

use super::Task;
use crate::core::error::{ConfigError, ShipError, ShipResult};
use petgraph::algo;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

pub struct TaskGraph {
  graph: DiGraph<Task, ()>,
  /// Index: task name → node index
  name_to_node: HashMap<String, NodeIndex>,
}

impl TaskGraph {
  /// Build the graph, rejecting duplicate names and prerequisites that name no task.
  ///
  /// Cycles are allowed here; they are reported by [`TaskGraph::cycles`] and
  /// rejected by [`TaskGraph::resolve`] for any task whose closure contains one.
  pub fn new(tasks: Vec<Task>) -> ShipResult<Self> {
    let mut graph = DiGraph::new();
    let mut name_to_node = HashMap::new();

    for task in tasks {
      let name = task.name.clone();
      if name_to_node.contains_key(&name) {
        return Err(ShipError::Config(ConfigError::InvalidTask {
          task: name,
          reason: "defined more than once".to_string(),
        }));
      }
      let idx = graph.add_node(task);
      name_to_node.insert(name, idx);
    }

    let mut edges = Vec::new();
    for idx in graph.node_indices() {
      let task = &graph[idx];
      for prerequisite in &task.prerequisites {
        let Some(&target) = name_to_node.get(prerequisite) else {
          return Err(ShipError::Config(ConfigError::UnknownPrerequisite {
            task: task.name.clone(),
            prerequisite: prerequisite.clone(),
          }));
        };
        edges.push((idx, target));
      }
    }
    for (from, to) in edges {
      graph.add_edge(from, to, ());
    }

    Ok(Self { graph, name_to_node })
  }

  pub fn task(&self, name: &str) -> ShipResult<&Task> {
    self
      .name_to_node
      .get(name)
      .map(|&idx| &self.graph[idx])
      .ok_or_else(|| ShipError::UnknownTask { name: name.to_string() })
  }

  /// All tasks, sorted by name
  pub fn tasks(&self) -> Vec<&Task> {
    let mut tasks: Vec<&Task> = self.graph.node_weights().collect();
    tasks.sort_by(|a, b| a.name.cmp(&b.name));
    tasks
  }

  /// Prerequisite closure of `name` followed by `name` itself.
  ///
  /// Every task appears once, after all of its prerequisites, at the earliest
  /// point any path demands it.
  pub fn resolve(&self, name: &str) -> ShipResult<Vec<&Task>> {
    let mut order = Vec::new();
    let mut in_progress = HashSet::new();
    let mut done = HashSet::new();
    self.visit(name, &mut in_progress, &mut done, &mut order)?;
    Ok(order)
  }

  fn visit<'g>(
    &'g self,
    name: &str,
    in_progress: &mut HashSet<String>,
    done: &mut HashSet<String>,
    order: &mut Vec<&'g Task>,
  ) -> ShipResult<()> {
    if done.contains(name) {
      return Ok(());
    }
    if in_progress.contains(name) {
      return Err(ShipError::Cycle { task: name.to_string() });
    }

    let task = self.task(name)?;
    in_progress.insert(name.to_string());
    for prerequisite in &task.prerequisites {
      self.visit(prerequisite, in_progress, done, order)?;
    }
    in_progress.remove(name);

    done.insert(name.to_string());
    order.push(task);
    Ok(())
  }

  /// Prerequisite cycles anywhere in the graph (Tarjan's SCC), each sorted by name
  pub fn cycles(&self) -> Vec<Vec<String>> {
    let mut cycles: Vec<Vec<String>> = algo::tarjan_scc(&self.graph)
      .into_iter()
      .filter(|component| component.len() > 1 || self.graph.contains_edge(component[0], component[0]))
      .map(|component| {
        let mut names: Vec<String> = component.into_iter().map(|idx| self.graph[idx].name.clone()).collect();
        names.sort();
        names
      })
      .collect();
    cycles.sort();
    cycles
  }
}
