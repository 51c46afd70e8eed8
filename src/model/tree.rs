use rustc_hash::FxHashMap;

/// Whether a node is a file or a directory. Only directories own children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    File,
    Directory(FxHashMap<String, TreeNode>),
}

/// A node in the reconstructed directory tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeNode {
    pub name: String,
    /// File: literal byte count. Directory: sum over descendants after `compute_totals`.
    pub size: u64,
    /// Number of files in this subtree (1 for a file)
    pub file_count: u64,
    pub kind: NodeKind,
}

impl TreeNode {
    /// The account root ("/"), an empty directory with no name
    pub fn root() -> Self {
        Self::directory("")
    }

    pub fn directory(name: &str) -> Self {
        Self {
            name: name.to_string(),
            size: 0,
            file_count: 0,
            kind: NodeKind::Directory(FxHashMap::default()),
        }
    }

    pub fn file(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
            file_count: 1,
            kind: NodeKind::File,
        }
    }

    #[inline]
    pub fn is_dir(&self) -> bool {
        matches!(self.kind, NodeKind::Directory(_))
    }

    pub fn kind_label(&self) -> &'static str {
        if self.is_dir() { "directory" } else { "file" }
    }

    /// Child mapping, `None` for files
    pub fn children(&self) -> Option<&FxHashMap<String, TreeNode>> {
        match &self.kind {
            NodeKind::Directory(children) => Some(children),
            NodeKind::File => None,
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut FxHashMap<String, TreeNode>> {
        match &mut self.kind {
            NodeKind::Directory(children) => Some(children),
            NodeKind::File => None,
        }
    }

    pub fn child(&self, name: &str) -> Option<&TreeNode> {
        self.children().and_then(|c| c.get(name))
    }

    /// Number of nodes in this subtree, including self
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        let mut stack = vec![self];
        while let Some(node) = stack.pop() {
            count += 1;
            if let Some(children) = node.children() {
                stack.extend(children.values());
            }
        }
        count
    }

    /// Roll sizes and file counts up from the files, bottom-up, in one pass.
    ///
    /// Directory totals are reset first, so calling this twice is harmless.
    /// Uses an explicit stack: each frame owns a node whose children have been
    /// moved out into `pending` and are moved back once they are totalled.
    pub fn compute_totals(&mut self) {
        struct Frame {
            node: TreeNode,
            pending: Vec<(String, TreeNode)>,
        }

        impl Frame {
            fn open(mut node: TreeNode) -> Self {
                let pending = match &mut node.kind {
                    NodeKind::Directory(children) => {
                        node.size = 0;
                        node.file_count = 0;
                        children.drain().collect()
                    }
                    NodeKind::File => {
                        node.file_count = 1;
                        Vec::new()
                    }
                };
                Self { node, pending }
            }

            fn absorb(&mut self, name: String, child: TreeNode) {
                // Saturates: sizes are untrusted u64s from the index
                self.node.size = self.node.size.saturating_add(child.size);
                self.node.file_count = self.node.file_count.saturating_add(child.file_count);
                if let NodeKind::Directory(children) = &mut self.node.kind {
                    children.insert(name, child);
                }
            }
        }

        let root = std::mem::replace(self, TreeNode::root());
        // Names travel alongside frames so the map keys are reused as-is
        let mut stack: Vec<(String, Frame)> = vec![(String::new(), Frame::open(root))];

        loop {
            let Some((_, top)) = stack.last_mut() else {
                return;
            };
            if let Some((name, child)) = top.pending.pop() {
                stack.push((name, Frame::open(child)));
                continue;
            }

            let Some((name, done)) = stack.pop() else {
                return;
            };
            match stack.last_mut() {
                Some((_, parent)) => parent.absorb(name, done.node),
                None => {
                    *self = done.node;
                    return;
                }
            }
        }
    }

    /// Visits all file nodes, calling `f` with the full path and node.
    /// Uses a reusable path buffer - only allocates once per file when caller clones.
    pub fn visit_files(&self, mut f: impl FnMut(&str, &TreeNode)) {
        // Stack stores (node, base_len) where base_len is path length before this node
        let mut stack: Vec<(&TreeNode, usize)> = Vec::new();
        let mut path = String::new();

        if let Some(children) = self.children() {
            for child in children.values() {
                stack.push((child, 0));
            }
        }

        while let Some((node, base_len)) = stack.pop() {
            path.truncate(base_len);
            path.push('/');
            path.push_str(&node.name);

            match &node.kind {
                NodeKind::File => f(&path, node),
                NodeKind::Directory(children) => {
                    let current_len = path.len();
                    for child in children.values() {
                        stack.push((child, current_len));
                    }
                }
            }
        }
    }
}
