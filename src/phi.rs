use std::collections::{BTreeMap, BTreeSet, HashSet};

use tracing::trace;

use crate::ir::cfg::{Cfg, Statement};

/// `block → list of variable ids requiring a phi at that block's start`,
/// as returned by PhiPlanner. Ids within a block's list are in
/// ascending order, which `FunctionLowerer` uses as phi creation order.
pub type PhiPlan = BTreeMap<u32, Vec<u32>>;

struct Cfg2<'a> {
    cfg: &'a Cfg,
    preds: BTreeMap<u32, Vec<u32>>,
    rpo: Vec<u32>,
    rpo_index: BTreeMap<u32, usize>,
}

fn build_preds(cfg: &Cfg) -> BTreeMap<u32, Vec<u32>> {
    let mut preds: BTreeMap<u32, Vec<u32>> = cfg.node_ids().map(|n| (n, Vec::new())).collect();
    for (&id, block) in &cfg.nodes {
        for succ in block.terminator.successors() {
            preds.entry(succ).or_default().push(id);
        }
    }
    preds
}

fn reverse_postorder(cfg: &Cfg) -> Vec<u32> {
    let mut visited = BTreeSet::new();
    let mut postorder = Vec::new();

    fn visit(cfg: &Cfg, node: u32, visited: &mut BTreeSet<u32>, postorder: &mut Vec<u32>) {
        if !visited.insert(node) {
            return;
        }
        if let Some(block) = cfg.nodes.get(&node) {
            for succ in block.terminator.successors() {
                visit(cfg, succ, visited, postorder);
            }
        }
        postorder.push(node);
    }

    visit(cfg, cfg.entry, &mut visited, &mut postorder);
    postorder.reverse();
    postorder
}

/// Immediate dominators via the Cooper-Harvey-Kennedy iterative algorithm.
/// Returns `idom[n]` for every reachable node except the entry, which
/// dominates itself.
fn immediate_dominators(g: &Cfg2) -> BTreeMap<u32, u32> {
    let entry = g.cfg.entry;
    let mut idom: BTreeMap<u32, u32> = BTreeMap::new();
    idom.insert(entry, entry);

    let intersect = |idom: &BTreeMap<u32, u32>, a: u32, b: u32, rpo_index: &BTreeMap<u32, usize>| -> u32 {
        let mut finger1 = a;
        let mut finger2 = b;
        while finger1 != finger2 {
            while rpo_index[&finger1] > rpo_index[&finger2] {
                finger1 = idom[&finger1];
            }
            while rpo_index[&finger2] > rpo_index[&finger1] {
                finger2 = idom[&finger2];
            }
        }
        finger1
    };

    let mut changed = true;
    while changed {
        changed = false;
        for &node in g.rpo.iter().filter(|&&n| n != entry) {
            let preds = &g.preds[&node];
            let mut new_idom = None;
            for &p in preds {
                if idom.contains_key(&p) {
                    new_idom = Some(match new_idom {
                        None => p,
                        Some(cur) => intersect(&idom, cur, p, &g.rpo_index),
                    });
                }
            }
            if let Some(new_idom) = new_idom {
                if idom.get(&node) != Some(&new_idom) {
                    idom.insert(node, new_idom);
                    changed = true;
                }
            }
        }
    }

    idom.remove(&entry);
    idom
}

/// Dominance frontiers via the standard algorithm driven off immediate
/// dominators (Cytron et al.).
fn dominance_frontiers(g: &Cfg2, idom: &BTreeMap<u32, u32>) -> BTreeMap<u32, BTreeSet<u32>> {
    let mut df: BTreeMap<u32, BTreeSet<u32>> = g.cfg.node_ids().map(|n| (n, BTreeSet::new())).collect();

    for &node in &g.rpo {
        let preds = &g.preds[&node];
        if preds.len() < 2 {
            continue;
        }
        for &p in preds {
            if !idom.contains_key(&p) && p != g.cfg.entry {
                continue;
            }
            let mut runner = p;
            let stop = idom.get(&node).copied().unwrap_or(node);
            while runner != stop {
                df.entry(runner).or_default().insert(node);
                match idom.get(&runner) {
                    Some(&next) => runner = next,
                    None => break,
                }
            }
        }
    }

    df
}

fn defs(cfg: &Cfg) -> BTreeMap<u32, BTreeSet<u32>> {
    let mut out = BTreeMap::new();
    for (&id, block) in &cfg.nodes {
        let mut ids = BTreeSet::new();
        for stmt in &block.statements {
            if let Statement::Move(var_id, _) = stmt {
                ids.insert(*var_id);
            }
        }
        out.insert(id, ids);
    }
    out
}

/// Computes where phi nodes must be placed: for every block B and every
/// variable id defined somewhere in B, places a phi at every block in the
/// iterated dominance frontier closure of B's definitions.
pub fn plan_phis(cfg: &Cfg) -> PhiPlan {
    let preds = build_preds(cfg);
    let rpo = reverse_postorder(cfg);
    let rpo_index = rpo.iter().enumerate().map(|(i, &n)| (n, i)).collect();
    let g = Cfg2 {
        cfg,
        preds,
        rpo,
        rpo_index,
    };

    let idom = immediate_dominators(&g);
    let df = dominance_frontiers(&g, &idom);
    let var_defs = defs(cfg);

    // has_phi[block] = set of var ids already planned there.
    let mut has_phi: BTreeMap<u32, BTreeSet<u32>> = cfg.node_ids().map(|n| (n, BTreeSet::new())).collect();

    // One worklist per variable: the standard Cytron placement algorithm,
    // run independently per id so a newly phi'd block re-enters the
    // worklist for that id only, until the DF(DF(...)) closure is reached.
    let mut all_vars: BTreeSet<u32> = BTreeSet::new();
    for ids in var_defs.values() {
        all_vars.extend(ids.iter().copied());
    }

    for var in all_vars {
        let mut worklist: Vec<u32> = var_defs
            .iter()
            .filter(|(_, ids)| ids.contains(&var))
            .map(|(&b, _)| b)
            .collect();
        let mut queued: HashSet<u32> = worklist.iter().copied().collect();

        while let Some(b) = worklist.pop() {
            queued.remove(&b);
            let frontier = match df.get(&b) {
                Some(f) => f.clone(),
                None => continue,
            };
            for x in frontier {
                let entry = has_phi.entry(x).or_default();
                if entry.insert(var) {
                    trace!(block = x, var, "planned phi");
                    if !queued.contains(&x) {
                        worklist.push(x);
                        queued.insert(x);
                    }
                }
            }
        }
    }

    has_phi
        .into_iter()
        .map(|(b, ids)| (b, ids.into_iter().collect()))
        .collect()
}
