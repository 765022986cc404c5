//! Step-by-step initialization of a node with several components
//!
//! An [`InitPhase`] is handed out once every component is attached and the
//! node is still inactive. Each step initializes one component and yields
//! the next step; the last one activates the node. Dropping a phase before
//! the last step (including an early `?` return) finalizes the node through
//! the failure path, the same as a failed initializer.

use crate::error::Result;
use crate::init::{ComponentRef, Initializable};
use crate::stage::Staging;
use crate::token::Position;
use stagehand_scene::{Component, NodeId, World};
use std::marker::PhantomData;

/// Initialization in progress for the components `L`, at step `STEP`
#[must_use = "dropping a phase finalizes the node as a failed initialization"]
pub struct InitPhase<'s, 'w, L, const STEP: usize> {
    staging: Staging<'s, 'w>,
    _components: PhantomData<fn() -> L>,
}

/// A [`StagedPair`](crate::StagedPair) waiting for its first component
pub type PairFirstPhase<'s, 'w, A, B> = InitPhase<'s, 'w, (A, B), 0>;
/// A [`StagedPair`](crate::StagedPair) waiting for its second component
pub type PairSecondPhase<'s, 'w, A, B> = InitPhase<'s, 'w, (A, B), 1>;
/// A [`StagedTriple`](crate::StagedTriple) waiting for its first component
pub type TripleFirstPhase<'s, 'w, A, B, C> = InitPhase<'s, 'w, (A, B, C), 0>;
/// A [`StagedTriple`](crate::StagedTriple) waiting for its second component
pub type TripleSecondPhase<'s, 'w, A, B, C> = InitPhase<'s, 'w, (A, B, C), 1>;
/// A [`StagedTriple`](crate::StagedTriple) waiting for its third component
pub type TripleThirdPhase<'s, 'w, A, B, C> = InitPhase<'s, 'w, (A, B, C), 2>;

impl<'s, 'w, L, const STEP: usize> InitPhase<'s, 'w, L, STEP> {
    pub(crate) fn new(staging: Staging<'s, 'w>) -> Self {
        Self {
            staging,
            _components: PhantomData,
        }
    }

    /// The node being initialized
    pub fn node(&self) -> NodeId {
        self.staging.node()
    }

    /// Read access to the world; the node is still inactive here
    pub fn world(&self) -> &World {
        self.staging.world_ref()
    }

    /// Any component on the node, initialized or not
    pub fn component<C: Component>(&mut self) -> Result<&mut C> {
        self.staging.component::<C>()
    }

    /// Typed handle to the sibling at `position`
    ///
    /// Fails if the token is past the end of the node's component list or
    /// `C` is not the type at that position.
    pub fn sibling<C: Component>(&self, position: impl Into<Position>) -> Result<ComponentRef<C>> {
        self.staging.sibling::<C>(position.into())
    }

    fn advance<const NEXT: usize>(self) -> InitPhase<'s, 'w, L, NEXT> {
        InitPhase::new(self.staging)
    }

    fn complete(self) -> Result<NodeId> {
        self.staging.complete()
    }
}

impl<'s, 'w, A, B> PairFirstPhase<'s, 'w, A, B>
where
    A: Component,
    B: Component,
{
    /// Leave the first component at its default
    pub fn init_first(self) -> PairSecondPhase<'s, 'w, A, B> {
        self.advance()
    }

    pub fn init_first_with<Args>(mut self, args: Args) -> Result<PairSecondPhase<'s, 'w, A, B>>
    where
        A: Initializable<Args>,
    {
        self.staging.run::<A, Args>(args)?;
        Ok(self.advance())
    }

    pub fn init_first_fn(
        mut self,
        init: impl FnOnce(&mut A),
    ) -> Result<PairSecondPhase<'s, 'w, A, B>> {
        self.staging.run_fn::<A>(init)?;
        Ok(self.advance())
    }
}

impl<'s, 'w, A, B> PairSecondPhase<'s, 'w, A, B>
where
    A: Component,
    B: Component,
{
    /// Leave the second component at its default and activate
    pub fn init_second(self) -> Result<NodeId> {
        self.complete()
    }

    /// Initialize the second component with `args` and activate
    pub fn init_second_with<Args>(mut self, args: Args) -> Result<NodeId>
    where
        B: Initializable<Args>,
    {
        self.staging.run::<B, Args>(args)?;
        self.complete()
    }

    pub fn init_second_fn(mut self, init: impl FnOnce(&mut B)) -> Result<NodeId> {
        self.staging.run_fn::<B>(init)?;
        self.complete()
    }
}

impl<'s, 'w, A, B, C> TripleFirstPhase<'s, 'w, A, B, C>
where
    A: Component,
    B: Component,
    C: Component,
{
    pub fn init_first(self) -> TripleSecondPhase<'s, 'w, A, B, C> {
        self.advance()
    }

    pub fn init_first_with<Args>(
        mut self,
        args: Args,
    ) -> Result<TripleSecondPhase<'s, 'w, A, B, C>>
    where
        A: Initializable<Args>,
    {
        self.staging.run::<A, Args>(args)?;
        Ok(self.advance())
    }

    pub fn init_first_fn(
        mut self,
        init: impl FnOnce(&mut A),
    ) -> Result<TripleSecondPhase<'s, 'w, A, B, C>> {
        self.staging.run_fn::<A>(init)?;
        Ok(self.advance())
    }
}

impl<'s, 'w, A, B, C> TripleSecondPhase<'s, 'w, A, B, C>
where
    A: Component,
    B: Component,
    C: Component,
{
    pub fn init_second(self) -> TripleThirdPhase<'s, 'w, A, B, C> {
        self.advance()
    }

    pub fn init_second_with<Args>(
        mut self,
        args: Args,
    ) -> Result<TripleThirdPhase<'s, 'w, A, B, C>>
    where
        B: Initializable<Args>,
    {
        self.staging.run::<B, Args>(args)?;
        Ok(self.advance())
    }

    pub fn init_second_fn(
        mut self,
        init: impl FnOnce(&mut B),
    ) -> Result<TripleThirdPhase<'s, 'w, A, B, C>> {
        self.staging.run_fn::<B>(init)?;
        Ok(self.advance())
    }
}

impl<'s, 'w, A, B, C> TripleThirdPhase<'s, 'w, A, B, C>
where
    A: Component,
    B: Component,
    C: Component,
{
    /// Leave the third component at its default and activate
    pub fn init_third(self) -> Result<NodeId> {
        self.complete()
    }

    /// Initialize the third component with `args` and activate
    pub fn init_third_with<Args>(mut self, args: Args) -> Result<NodeId>
    where
        C: Initializable<Args>,
    {
        self.staging.run::<C, Args>(args)?;
        self.complete()
    }

    pub fn init_third_fn(mut self, init: impl FnOnce(&mut C)) -> Result<NodeId> {
        self.staging.run_fn::<C>(init)?;
        self.complete()
    }
}
